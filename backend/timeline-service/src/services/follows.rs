//! The follow graph: who follows whom.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Viewer;
use crate::repository::{AuthorRepository, FollowRepository};

/// Maintains and queries the directed follow relationship. Edges are unique
/// per `(user, author)` pair and never self-referential.
pub struct FollowService {
    follows: Arc<dyn FollowRepository>,
    authors: Arc<dyn AuthorRepository>,
}

impl FollowService {
    pub fn new(follows: Arc<dyn FollowRepository>, authors: Arc<dyn AuthorRepository>) -> Self {
        Self { follows, authors }
    }

    /// Follow `target_username`. Idempotent: an existing edge is left as is.
    /// A self-follow is silently ignored; it has no observable effect.
    pub async fn follow(&self, viewer: &Viewer, target_username: &str) -> Result<()> {
        let user = viewer.require_author()?;
        let target = self
            .authors
            .find_by_username(target_username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("author '{}'", target_username)))?;

        if user.id == target.id {
            debug!("Ignoring self-follow by {}", user.username);
            return Ok(());
        }

        self.authors.upsert(user).await?;

        let created = self.follows.create(user.id, target.id).await?;
        if created {
            debug!("{} now follows {}", user.username, target.username);
        }

        Ok(())
    }

    /// Unfollow `target_username`. Idempotent: absent edges are a no-op.
    pub async fn unfollow(&self, viewer: &Viewer, target_username: &str) -> Result<()> {
        let user = viewer.require_author()?;
        let target = self
            .authors
            .find_by_username(target_username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("author '{}'", target_username)))?;

        if user.id == target.id {
            return Ok(());
        }

        let removed = self.follows.delete(user.id, target.id).await?;
        if removed {
            debug!("{} unfollowed {}", user.username, target.username);
        }

        Ok(())
    }

    /// Whether `user_id` follows `author_id`. One's own profile never counts
    /// as followed, so the pair short-circuits without a storage query.
    pub async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        if user_id == author_id {
            return Ok(false);
        }
        self.follows.exists(user_id, author_id).await
    }

    /// Author ids `user_id` follows; the feed composer builds the follow
    /// feed from this set.
    pub async fn following_of(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        self.follows.following_of(user_id).await
    }

    /// User ids following `author_id`.
    pub async fn followers_of(&self, author_id: Uuid) -> Result<Vec<Uuid>> {
        self.follows.followers_of(author_id).await
    }
}
