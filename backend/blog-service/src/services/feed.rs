/// Feed assembly - global, group, profile and following listings plus post detail
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::metrics::feed::{FEED_BUILD_DURATION_SECONDS, FEED_REQUEST_TOTAL};
use crate::models::{
    AuthorView, CommentFormView, CommentView, FeedItem, FeedPage, FeedScope, GroupFeed,
    PostDetail, ProfileFeed, User,
};
use crate::pagination::{Paginator, RequestedPage};

#[derive(Clone)]
pub struct FeedService {
    store: Store,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(store: Store, paginator: Paginator) -> Self {
        Self { store, paginator }
    }

    async fn page(&self, kind: &str, scope: FeedScope, requested: RequestedPage) -> Result<FeedPage> {
        FEED_REQUEST_TOTAL.with_label_values(&[kind]).inc();
        let started = Instant::now();

        let page = self
            .store
            .posts
            .list_page(&scope, &self.paginator, requested)
            .await?;

        FEED_BUILD_DURATION_SECONDS
            .with_label_values(&[kind])
            .observe(started.elapsed().as_secs_f64());
        debug!(
            feed = kind,
            page = page.number,
            total_pages = page.total_pages,
            "Feed page assembled"
        );
        Ok(FeedPage::from(page))
    }

    /// Every post, newest first
    pub async fn global_feed(&self, requested: RequestedPage) -> Result<FeedPage> {
        self.page("global", FeedScope::All, requested).await
    }

    pub async fn group_feed(&self, slug: &str, requested: RequestedPage) -> Result<GroupFeed> {
        let group = self
            .store
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;

        let feed = self.page("group", FeedScope::Group(group.id), requested).await?;
        Ok(GroupFeed {
            group: group.into(),
            feed,
        })
    }

    /// An author's posts with their total count and whether `viewer` follows them.
    pub async fn profile_feed(
        &self,
        username: &str,
        requested: RequestedPage,
        viewer: Option<&User>,
    ) -> Result<ProfileFeed> {
        let author = self
            .store
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;

        let posts_count = self.store.posts.count_by_author(author.id).await?;
        let following = match viewer {
            Some(viewer) if viewer.id != author.id => {
                self.store.follows.is_following(viewer.id, author.id).await?
            }
            _ => false,
        };
        let feed = self
            .page("profile", FeedScope::Author(author.id), requested)
            .await?;

        Ok(ProfileFeed {
            profile: AuthorView::from(&author),
            posts_count,
            following,
            feed,
        })
    }

    /// Posts by authors `user_id` follows; empty when they follow nobody.
    pub async fn following_feed(&self, user_id: Uuid, requested: RequestedPage) -> Result<FeedPage> {
        self.page("following", FeedScope::FollowedBy(user_id), requested)
            .await
    }

    pub async fn post_detail(&self, post_id: i64) -> Result<PostDetail> {
        FEED_REQUEST_TOTAL.with_label_values(&["detail"]).inc();

        let post = self
            .store
            .posts
            .find_details(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        let author_posts_count = self.store.posts.count_by_author(post.author_id).await?;
        let comments = self
            .store
            .comments
            .list_by_post(post_id)
            .await?
            .into_iter()
            .map(CommentView::from)
            .collect();

        Ok(PostDetail {
            post_title: post.title(),
            post: FeedItem::from(post),
            author_posts_count,
            comments,
            comment_form: CommentFormView::default(),
        })
    }
}
