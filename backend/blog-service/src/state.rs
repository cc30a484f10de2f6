use crate::cache::PageCache;
use crate::config::SiteConfig;
use crate::db::Store;
use crate::middleware::SessionKeys;
use crate::pagination::Paginator;
use crate::services::{CommentService, FeedService, FollowService, PostService};

/// Shared application state handed to every handler via `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub feed: FeedService,
    pub posts: PostService,
    pub comments: CommentService,
    pub follows: FollowService,
    /// Serialized global feed pages
    pub page_cache: PageCache<String>,
    pub sessions: SessionKeys,
    pub site: SiteConfig,
}

impl AppState {
    pub fn new(store: Store, site: SiteConfig) -> Self {
        let paginator = Paginator::new(site.posts_per_page);
        Self {
            feed: FeedService::new(store.clone(), paginator),
            posts: PostService::new(store.clone()),
            comments: CommentService::new(store.clone()),
            follows: FollowService::from_store(&store),
            page_cache: PageCache::new(site.feed_cache_ttl(), site.feed_cache_max_entries),
            sessions: SessionKeys::new(&site.session_secret),
            store,
            site,
        }
    }
}
