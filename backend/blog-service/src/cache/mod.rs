/// Page-level caching
///
/// Only the global index is cached, one entry per page number, for a short
/// fixed lifetime.
pub mod page_cache;

pub use page_cache::PageCache;
