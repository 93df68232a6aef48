//! Post comments. Append-only: no edit or delete paths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Author, Comment, CommentView, NewComment};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, new: NewComment) -> Result<Comment>;

    /// Comments under a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>>;
}

#[derive(sqlx::FromRow)]
struct CommentViewRow {
    id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
}

impl From<CommentViewRow> for CommentView {
    fn from(row: CommentViewRow) -> Self {
        CommentView {
            id: row.id,
            author: Author {
                id: row.author_id,
                username: row.author_username,
            },
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
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
    async fn create(&self, new: NewComment) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, author_id, text, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, post_id, author_id, text, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.post_id)
        .bind(new.author_id)
        .bind(&new.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>> {
        let rows = sqlx::query_as::<_, CommentViewRow>(
            r#"
            SELECT c.id, c.text, c.created_at,
                   a.id AS author_id, a.username AS author_username
            FROM comments c
            JOIN authors a ON a.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentView::from).collect())
    }
}
