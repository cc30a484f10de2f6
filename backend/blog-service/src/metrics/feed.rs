use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, HistogramVec,
    IntCounterVec, IntGauge,
};

lazy_static! {
    /// Feed requests by kind (global, group, profile, following, detail).
    pub static ref FEED_REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_feed_request_total",
        "Total feed requests segmented by feed kind",
        &["feed"]
    )
    .expect("failed to register blog_feed_request_total");

    /// Time spent assembling a feed page, cache hits excluded.
    pub static ref FEED_BUILD_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "blog_feed_build_duration_seconds",
        "Feed assembly duration segmented by feed kind",
        &["feed"]
    )
    .expect("failed to register blog_feed_build_duration_seconds");

    /// Page cache events (hit/miss/expired/evict/invalidate).
    pub static ref PAGE_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "blog_page_cache_events_total",
        "Page cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register blog_page_cache_events_total");

    /// Entries currently held by the page cache.
    pub static ref PAGE_CACHE_ENTRIES: IntGauge = register_int_gauge!(
        "blog_page_cache_entries",
        "Number of entries held by the page cache"
    )
    .expect("failed to register blog_page_cache_entries");

    /// Subscription transitions (created/existing/removed/absent).
    pub static ref FOLLOW_EVENTS: IntCounterVec = register_int_counter_vec!(
        "blog_follow_events_total",
        "Follow and unfollow outcomes",
        &["event"]
    )
    .expect("failed to register blog_follow_events_total");
}
