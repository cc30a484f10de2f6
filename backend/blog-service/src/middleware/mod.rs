/// HTTP request utilities for blog-service
///
/// Provides the session identity extractor and the ownership/login guards
/// handlers compose before calling into services.
pub mod permissions;
pub mod session;

pub use permissions::*;
pub use session::{CurrentUser, SessionClaims, SessionKeys};
