//! Domain models: persisted entities, the viewer identity, and the read
//! models served by feeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A platform author. Identity is owned by the upstream identity system;
/// this service keeps a reference row so entities have a foreign-key target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

/// The requesting identity, as forwarded by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Authenticated(Author),
}

impl Viewer {
    pub fn author(&self) -> Option<&Author> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Authenticated(author) => Some(author),
        }
    }

    /// The authenticated author, or `AuthRequired`.
    pub fn require_author(&self) -> Result<&Author> {
        self.author().ok_or(AppError::AuthRequired)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated(_))
    }
}

/// Thematic group posts can be filed under.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A post as persisted. `group_id` is nullable: posts survive group removal.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Comment on a post. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Directed follow edge: `user_id` follows `author_id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Group descriptor embedded in feed items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub slug: String,
    pub title: String,
}

/// A post joined with its author and group, as rendered in feeds and the
/// post detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub author: Author,
    pub group: Option<GroupRef>,
    pub text: String,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A comment joined with its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub author: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new post. Group membership is resolved from the slug by the
/// service before this reaches the store.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image_key: Option<String>,
}

/// Replacement values for an edit. Edits replace the editable fields as a
/// whole; `group_id: None` detaches the post from its group.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Editable group fields. The slug is the group's URL identity and stays
/// fixed after creation.
#[derive(Debug, Clone)]
pub struct GroupChanges {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
}
