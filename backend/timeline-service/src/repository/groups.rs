//! Thematic groups. Created and edited administratively; resolved by slug
//! for the group feed.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Group, GroupChanges, NewGroup};

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, new: NewGroup) -> Result<Group>;

    /// Edit title/description. Returns `None` when the group does not exist.
    async fn update(&self, id: Uuid, changes: GroupChanges) -> Result<Option<Group>>;

    /// Remove a group. Posts filed under it keep existing with their group
    /// reference nullified, never cascade-deleted.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    async fn list(&self) -> Result<Vec<Group>>;
}

#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn create(&self, new: NewGroup) -> Result<Group> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (id, title, slug, description, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, title, slug, description, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.slug)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    async fn update(&self, id: Uuid, changes: GroupChanges) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET title = $2, description = $3
            WHERE id = $1
            RETURNING id, title, slug, description, created_at
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        // posts.group_id is ON DELETE SET NULL, so this never removes posts
        let result = sqlx::query(
            r#"
            DELETE FROM groups WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, title, slug, description, created_at
            FROM groups
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn list(&self) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, title, slug, description, created_at
            FROM groups
            ORDER BY title ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }
}
