/// View-models returned by the HTTP layer
///
/// Every listing and form page is described by one of these structs. They are
/// what a template layer would consume, serialized here as JSON.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::{CommentDetails, Group, PostDetails, PostForm, User};
use crate::pagination::Page;

/// Field name -> validation messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthorView {
    pub username: String,
    pub display_name: String,
}

impl From<&User> for AuthorView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            display_name: user.display_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupRef {
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedItem {
    pub id: i64,
    pub text: String,
    pub author: AuthorView,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<PostDetails> for FeedItem {
    fn from(post: PostDetails) -> Self {
        let author = User {
            id: post.author_id,
            username: post.author_username,
            first_name: post.author_first_name,
            last_name: post.author_last_name,
            email: String::new(),
        };
        let group = match (post.group_title, post.group_slug) {
            (Some(title), Some(slug)) => Some(GroupRef { title, slug }),
            _ => None,
        };

        Self {
            id: post.id,
            text: post.text,
            author: AuthorView::from(&author),
            group,
            image: post.image,
            created_at: post.created_at,
        }
    }
}

/// Position of a page inside its listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageInfo {
    pub number: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page: Option<usize>,
    pub previous_page: Option<usize>,
}

impl<T> From<&Page<T>> for PageInfo {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number,
            per_page: page.per_page,
            total_pages: page.total_pages,
            total_count: page.total_count,
            has_next: page.has_next,
            has_previous: page.has_previous,
            next_page: page.next_page_number(),
            previous_page: page.previous_page_number(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedPage {
    pub posts: Vec<FeedItem>,
    pub page: PageInfo,
}

impl From<Page<PostDetails>> for FeedPage {
    fn from(page: Page<PostDetails>) -> Self {
        let page = page.map(FeedItem::from);
        Self {
            page: PageInfo::from(&page),
            posts: page.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupView {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<Group> for GroupView {
    fn from(group: Group) -> Self {
        Self {
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupFeed {
    pub group: GroupView,
    pub feed: FeedPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileFeed {
    pub profile: AuthorView,
    /// Total posts by the author, independent of the page shown
    pub posts_count: i64,
    /// Whether the viewer follows this author
    pub following: bool,
    pub feed: FeedPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CommentView {
    pub id: i64,
    pub author: AuthorView,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentDetails> for CommentView {
    fn from(comment: CommentDetails) -> Self {
        let author = User {
            id: comment.author_id,
            username: comment.author_username,
            first_name: comment.author_first_name,
            last_name: comment.author_last_name,
            email: String::new(),
        };
        Self {
            id: comment.id,
            author: AuthorView::from(&author),
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PostDetail {
    /// First characters of the post text
    pub post_title: String,
    pub post: FeedItem,
    pub author_posts_count: i64,
    pub comments: Vec<CommentView>,
    /// Empty comment form rendered under the post
    pub comment_form: CommentFormView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupChoice {
    pub id: i64,
    pub title: String,
}

impl From<&Group> for GroupChoice {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            title: group.title.clone(),
        }
    }
}

/// Post create/edit form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PostFormView {
    pub form: PostForm,
    pub errors: BTreeMap<String, Vec<String>>,
    pub is_edit: bool,
    pub post_id: Option<i64>,
    pub groups: Vec<GroupChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CommentFormView {
    pub text: String,
    pub errors: BTreeMap<String, Vec<String>>,
}
