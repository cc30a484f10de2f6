use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::UserRepository;
use crate::error::{AppError, Result};
use crate::models::{NewUser, User};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, first_name, last_name, email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, first_name, last_name, email
            "#,
        )
        .bind(user.id.unwrap_or_else(Uuid::new_v4))
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            err if err.is_unique_violation() => {
                AppError::Conflict(format!("username '{}' is taken", user.username))
            }
            err => err,
        })?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, first_name, last_name, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, first_name, last_name, email FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        // posts, comments and follows go with the user via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
