//! The follow graph's storage: directed edges, unique per pair.
//!
//! Uniqueness lives in the schema (`UNIQUE (user_id, author_id)`), so two
//! concurrent follow calls for the same pair collapse into one edge instead
//! of racing an application-level check. Self-edges are rejected by a CHECK
//! constraint; callers filter them out before reaching this layer.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Create the edge if absent. Returns whether a new edge was written.
    async fn create(&self, user_id: Uuid, author_id: Uuid) -> Result<bool>;

    /// Delete the edge if present. Returns whether an edge existed.
    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool>;

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool>;

    /// Authors the user follows, most recent edge first.
    async fn following_of(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    /// Users following the author, most recent edge first.
    async fn followers_of(&self, author_id: Uuid) -> Result<Vec<Uuid>>;
}

#[derive(Clone)]
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
    async fn create(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let inserted = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO follows (id, user_id, author_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, author_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.is_some())
    }

    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM follows WHERE user_id = $1 AND author_id = $2
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT author_id FROM follows
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn followers_of(&self, author_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id FROM follows
            WHERE author_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
