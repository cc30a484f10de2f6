use async_trait::async_trait;
use sqlx::PgPool;

use super::CommentRepository;
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentDetails, NewComment};

pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, text, created_at
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from(e).missing_reference(format!("post {}", comment.post_id)))?;

        Ok(created)
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentDetails>> {
        let comments = sqlx::query_as::<_, CommentDetails>(
            r#"
            SELECT c.id, c.post_id, c.author_id, c.text, c.created_at,
                   u.username AS author_username,
                   u.first_name AS author_first_name,
                   u.last_name AS author_last_name
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
