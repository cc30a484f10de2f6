use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::GroupRepository;
use crate::error::{AppError, Result};
use crate::models::{Group, NewGroup};

pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn slug_conflict(slug: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| match AppError::from(e) {
        err if err.is_unique_violation() => {
            AppError::Conflict(format!("group slug '{}' already exists", slug))
        }
        err => err,
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        let created = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO post_groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await
        .map_err(slug_conflict(&group.slug))?;

        info!(group_id = created.id, slug = %created.slug, "Group created");
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn delete_group(&self, id: i64) -> Result<bool> {
        // posts.group_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM post_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!(group_id = id, "Group deleted");
        }
        Ok(result.rows_affected() > 0)
    }
}
