//! Local author reference rows.
//!
//! Identity is owned by the upstream identity system. A reference row is
//! upserted whenever an authenticated viewer writes, so posts, comments, and
//! follow edges always have a foreign-key target.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Author;

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Insert or refresh the reference row for an author.
    async fn upsert(&self, author: &Author) -> Result<()>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Author>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>>;
}

#[derive(Clone)]
pub struct PgAuthorRepository {
    pool: PgPool,
}

impl PgAuthorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorRepository for PgAuthorRepository {
    async fn upsert(&self, author: &Author) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO authors (id, username, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE SET username = EXCLUDED.username
            "#,
        )
        .bind(author.id)
        .bind(&author.username)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(
            r#"
            SELECT id, username FROM authors WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(author)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(
            r#"
            SELECT id, username FROM authors WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(author)
    }
}
