/// Post service - handles post creation, editing and deletion
///
/// Authorship is always taken from the caller, never from submitted data.
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::middleware::{check_post_ownership, require_post_owner, Ownership};
use crate::models::forms::{add_error, CleanPost, INVALID_CHOICE_MESSAGE};
use crate::models::{
    FieldErrors, GroupChoice, NewPost, Post, PostChanges, PostForm, PostFormView, User,
};

/// Result of a create submission
#[derive(Debug)]
pub enum FormOutcome {
    Saved(Post),
    /// Nothing was written; re-render this form
    Invalid(PostFormView),
}

/// Result of an edit request
#[derive(Debug)]
pub enum EditOutcome<T> {
    Ready(T),
    /// Requester is not the author; nothing was changed
    NotAuthor,
    Invalid(PostFormView),
}

#[derive(Clone)]
pub struct PostService {
    store: Store,
}

impl PostService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn group_choices(&self) -> Result<Vec<GroupChoice>> {
        Ok(self
            .store
            .groups
            .list_groups()
            .await?
            .iter()
            .map(GroupChoice::from)
            .collect())
    }

    /// Blank form for `/create/`
    pub async fn create_form(&self) -> Result<PostFormView> {
        Ok(PostFormView {
            form: PostForm::default(),
            errors: FieldErrors::new(),
            is_edit: false,
            post_id: None,
            groups: self.group_choices().await?,
        })
    }

    async fn validate(&self, form: &PostForm) -> Result<std::result::Result<CleanPost, FieldErrors>> {
        let mut clean = form.clean();
        if let Ok(post) = &clean {
            if let Some(group_id) = post.group_id {
                if self.store.groups.find_by_id(group_id).await?.is_none() {
                    let mut errors = FieldErrors::new();
                    add_error(&mut errors, "group", INVALID_CHOICE_MESSAGE);
                    clean = Err(errors);
                }
            }
        }
        Ok(clean)
    }

    async fn invalid_form(
        &self,
        form: PostForm,
        errors: FieldErrors,
        post_id: Option<i64>,
    ) -> Result<PostFormView> {
        Ok(PostFormView {
            form,
            errors,
            is_edit: post_id.is_some(),
            post_id,
            groups: self.group_choices().await?,
        })
    }

    pub async fn create_post(&self, author: &User, form: PostForm) -> Result<FormOutcome> {
        let clean = match self.validate(&form).await? {
            Ok(clean) => clean,
            Err(errors) => {
                return Ok(FormOutcome::Invalid(
                    self.invalid_form(form, errors, None).await?,
                ))
            }
        };

        let post = self
            .store
            .posts
            .create_post(NewPost {
                author_id: author.id,
                text: clean.text,
                group_id: clean.group_id,
                image: clean.image,
            })
            .await?;

        info!(post_id = post.id, author = %author.username, "Post created");
        Ok(FormOutcome::Saved(post))
    }

    async fn load(&self, post_id: i64) -> Result<Post> {
        self.store
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }

    /// Pre-filled form for the author
    pub async fn edit_form(&self, requester: &User, post_id: i64) -> Result<EditOutcome<PostFormView>> {
        let post = self.load(post_id).await?;
        if check_post_ownership(requester.id, &post) == Ownership::NotOwner {
            return Ok(EditOutcome::NotAuthor);
        }

        Ok(EditOutcome::Ready(PostFormView {
            form: PostForm {
                text: post.text,
                group: post.group_id.map(|id| id.to_string()),
                image: post.image,
            },
            errors: FieldErrors::new(),
            is_edit: true,
            post_id: Some(post_id),
            groups: self.group_choices().await?,
        }))
    }

    pub async fn edit_post(
        &self,
        requester: &User,
        post_id: i64,
        form: PostForm,
    ) -> Result<EditOutcome<Post>> {
        let post = self.load(post_id).await?;
        if check_post_ownership(requester.id, &post) == Ownership::NotOwner {
            warn!(
                post_id,
                requester = %requester.username,
                "Edit attempt by non-author ignored"
            );
            return Ok(EditOutcome::NotAuthor);
        }

        let clean = match self.validate(&form).await? {
            Ok(clean) => clean,
            Err(errors) => {
                return Ok(EditOutcome::Invalid(
                    self.invalid_form(form, errors, Some(post_id)).await?,
                ))
            }
        };

        let updated = self
            .store
            .posts
            .update_post(
                post_id,
                PostChanges {
                    text: clean.text,
                    group_id: clean.group_id,
                    image: clean.image,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        info!(post_id, "Post updated");
        Ok(EditOutcome::Ready(updated))
    }

    /// Deletes the post and its comments; only the author may do this.
    pub async fn delete_post(&self, requester_id: Uuid, post_id: i64) -> Result<Post> {
        let post = self.load(post_id).await?;
        require_post_owner(requester_id, &post)?;

        self.store.posts.delete_post(post_id).await?;
        info!(post_id, "Post deleted");
        Ok(post)
    }
}
