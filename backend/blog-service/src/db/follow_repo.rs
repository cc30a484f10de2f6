use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::FollowRepository;
use crate::error::{AppError, Result};

pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    /// Idempotent create follow; returns true if a new row was inserted.
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let inserted = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO follows (user_id, author_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, author_id) DO NOTHING
            RETURNING user_id
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await;

        match inserted {
            Ok(row) => Ok(row.is_some()),
            // a concurrent insert of the same pair won the race
            Err(e) => match AppError::from(e) {
                err if err.is_unique_violation() => Ok(false),
                err => Err(err),
            },
        }
    }

    /// Idempotent delete; returns true if a row was removed.
    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
