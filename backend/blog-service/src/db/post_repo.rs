use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use super::PostRepository;
use crate::error::{AppError, Result};
use crate::models::{FeedScope, NewPost, Post, PostChanges, PostDetails};
use crate::pagination::{Page, Paginator, RequestedPage};

/// Scope filter shared by the count and the slice; binds $1..$3.
const SCOPE_FILTER: &str = r#"
    ($1::BIGINT IS NULL OR p.group_id = $1)
    AND ($2::UUID IS NULL OR p.author_id = $2)
    AND ($3::UUID IS NULL OR p.author_id IN (
        SELECT f.author_id FROM follows f WHERE f.user_id = $3
    ))
"#;

const DETAILS_COLUMNS: &str = r#"
    p.id, p.text, p.created_at, p.author_id, p.group_id, p.image,
    u.username AS author_username,
    u.first_name AS author_first_name,
    u.last_name AS author_last_name,
    g.title AS group_title,
    g.slug AS group_slug
"#;

fn post_refs(post: &NewPost) -> String {
    match post.group_id {
        Some(group_id) => format!("author {} or group {}", post.author_id, group_id),
        None => format!("author {}", post.author_id),
    }
}

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let created = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (text, author_id, group_id, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, text, created_at, author_id, group_id, image
            "#,
        )
        .bind(&post.text)
        .bind(post.author_id)
        .bind(post.group_id)
        .bind(&post.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from(e).missing_reference(post_refs(&post)))?;

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, text, created_at, author_id, group_id, image FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>> {
        let sql = format!(
            r#"
            SELECT {DETAILS_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN post_groups g ON g.id = p.group_id
            WHERE p.id = $1
            "#
        );
        let post = sqlx::query_as::<_, PostDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET text = $2, group_id = $3, image = COALESCE($4, image)
            WHERE id = $1
            RETURNING id, text, created_at, author_id, group_id, image
            "#,
        )
        .bind(id)
        .bind(&changes.text)
        .bind(changes.group_id)
        .bind(&changes.image)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::from(e).missing_reference(format!("group {:?}", changes.group_id))
        })?;

        Ok(post)
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        // comments are ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn list_page(
        &self,
        scope: &FeedScope,
        paginator: &Paginator,
        requested: RequestedPage,
    ) -> Result<Page<PostDetails>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let count_sql = format!("SELECT COUNT(*) AS count FROM posts p WHERE {SCOPE_FILTER}");
        let total: i64 = sqlx::query(&count_sql)
            .bind(scope.group_id())
            .bind(scope.author_id())
            .bind(scope.follower_id())
            .fetch_one(&mut *tx)
            .await?
            .get("count");

        let window = paginator.window(total.max(0) as usize, requested);

        let page_sql = format!(
            r#"
            SELECT {DETAILS_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN post_groups g ON g.id = p.group_id
            WHERE {SCOPE_FILTER}
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $4 OFFSET $5
            "#
        );
        let items = sqlx::query_as::<_, PostDetails>(&page_sql)
            .bind(scope.group_id())
            .bind(scope.author_id())
            .bind(scope.follower_id())
            .bind(window.limit as i64)
            .bind(window.offset as i64)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            ?scope,
            page = window.number,
            total_count = window.total_count,
            "Loaded post page"
        );
        Ok(Page::from_window(items, window))
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
