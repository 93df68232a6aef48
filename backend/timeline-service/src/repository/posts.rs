//! Posts: the entities every feed is composed from.
//!
//! List queries return joined `PostView` rows in the canonical feed order,
//! `created_at DESC` with `id DESC` as a deterministic tiebreak.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Author, GroupRef, NewPost, Post, PostChanges, PostView};

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post. Creation and field assignment are one atomic statement.
    async fn create(&self, new: NewPost) -> Result<Post>;

    /// Replace the editable fields. Returns `None` when the post does not
    /// exist. Ownership is checked by the service, not here.
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn find(&self, id: Uuid) -> Result<Option<PostView>>;

    /// Every post, newest first. Source of the global feed.
    async fn list_all(&self) -> Result<Vec<PostView>>;

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PostView>>;

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<PostView>>;

    /// Posts by any of the given authors, newest first. Source of the
    /// follow feed; an empty id set yields an empty list.
    async fn list_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<PostView>>;
}

/// Flat row shape for the joined post queries.
#[derive(sqlx::FromRow)]
struct PostViewRow {
    id: Uuid,
    text: String,
    image_key: Option<String>,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
    group_slug: Option<String>,
    group_title: Option<String>,
}

impl From<PostViewRow> for PostView {
    fn from(row: PostViewRow) -> Self {
        let group = match (row.group_slug, row.group_title) {
            (Some(slug), Some(title)) => Some(GroupRef { slug, title }),
            _ => None,
        };

        PostView {
            id: row.id,
            author: Author {
                id: row.author_id,
                username: row.author_username,
            },
            group,
            text: row.text,
            image_key: row.image_key,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
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
    async fn create(&self, new: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, author_id, group_id, text, image_key, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, author_id, group_id, text, image_key, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.author_id)
        .bind(new.group_id)
        .bind(&new.text)
        .bind(&new.image_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET group_id = $2, text = $3, image_key = $4
            WHERE id = $1
            RETURNING id, author_id, group_id, text, image_key, created_at
            "#,
        )
        .bind(id)
        .bind(changes.group_id)
        .bind(&changes.text)
        .bind(&changes.image_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find(&self, id: Uuid) -> Result<Option<PostView>> {
        let row = sqlx::query_as::<_, PostViewRow>(
            r#"
            SELECT p.id, p.text, p.image_key, p.created_at,
                   a.id AS author_id, a.username AS author_username,
                   g.slug AS group_slug, g.title AS group_title
            FROM posts p
            JOIN authors a ON a.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PostView::from))
    }

    async fn list_all(&self) -> Result<Vec<PostView>> {
        let rows = sqlx::query_as::<_, PostViewRow>(
            r#"
            SELECT p.id, p.text, p.image_key, p.created_at,
                   a.id AS author_id, a.username AS author_username,
                   g.slug AS group_slug, g.title AS group_title
            FROM posts p
            JOIN authors a ON a.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PostView>> {
        let rows = sqlx::query_as::<_, PostViewRow>(
            r#"
            SELECT p.id, p.text, p.image_key, p.created_at,
                   a.id AS author_id, a.username AS author_username,
                   g.slug AS group_slug, g.title AS group_title
            FROM posts p
            JOIN authors a ON a.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            WHERE p.group_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<PostView>> {
        let rows = sqlx::query_as::<_, PostViewRow>(
            r#"
            SELECT p.id, p.text, p.image_key, p.created_at,
                   a.id AS author_id, a.username AS author_username,
                   g.slug AS group_slug, g.title AS group_title
            FROM posts p
            JOIN authors a ON a.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            WHERE p.author_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn list_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<PostView>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PostViewRow>(
            r#"
            SELECT p.id, p.text, p.image_key, p.created_at,
                   a.id AS author_id, a.username AS author_username,
                   g.slug AS group_slug, g.title AS group_title
            FROM posts p
            JOIN authors a ON a.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            WHERE p.author_id = ANY($1)
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(author_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }
}
