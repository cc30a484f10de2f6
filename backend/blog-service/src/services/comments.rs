/// Comment service - adds comments to existing posts
use tracing::info;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentForm, CommentFormView, NewComment, User};

#[derive(Debug)]
pub enum CommentOutcome {
    Saved(Comment),
    Invalid(CommentFormView),
}

#[derive(Clone)]
pub struct CommentService {
    store: Store,
}

impl CommentService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn add_comment(
        &self,
        author: &User,
        post_id: i64,
        form: CommentForm,
    ) -> Result<CommentOutcome> {
        if self.store.posts.find_by_id(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        let text = match form.clean() {
            Ok(text) => text,
            Err(errors) => {
                return Ok(CommentOutcome::Invalid(CommentFormView {
                    text: form.text,
                    errors,
                }))
            }
        };

        let comment = self
            .store
            .comments
            .create_comment(NewComment {
                post_id,
                author_id: author.id,
                text,
            })
            .await?;

        info!(post_id, comment_id = comment.id, "Comment added");
        Ok(CommentOutcome::Saved(comment))
    }
}
