//! Post write paths and the detail view. Edits and deletes are
//! author-only; the ownership check lives here, not in the store.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    CommentView, Group, GroupRef, NewPost, PostChanges, PostView, Viewer,
};
use crate::repository::{AuthorRepository, CommentRepository, GroupRepository, PostRepository};

/// Author-supplied fields for creating or editing a post. Edits replace the
/// editable fields as a whole: an absent group slug detaches the post.
#[derive(Debug, Clone)]
pub struct PostInput {
    pub text: String,
    pub group_slug: Option<String>,
    pub image_key: Option<String>,
}

/// Post detail view: the post plus its comments, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    authors: Arc<dyn AuthorRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        authors: Arc<dyn AuthorRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            posts,
            groups,
            authors,
            comments,
        }
    }

    async fn resolve_group(&self, slug: Option<&str>) -> Result<Option<Group>> {
        match slug {
            Some(slug) => {
                let group = self
                    .groups
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;
                Ok(Some(group))
            }
            None => Ok(None),
        }
    }

    /// Create a post for the authenticated viewer.
    pub async fn create(&self, viewer: &Viewer, input: PostInput) -> Result<PostView> {
        let author = viewer.require_author()?;

        if input.text.trim().is_empty() {
            return Err(AppError::InvalidInput("post text must not be blank".into()));
        }

        let group = self.resolve_group(input.group_slug.as_deref()).await?;

        self.authors.upsert(author).await?;

        let post = self
            .posts
            .create(NewPost {
                author_id: author.id,
                group_id: group.as_ref().map(|g| g.id),
                text: input.text,
                image_key: input.image_key,
            })
            .await?;

        debug!("Post {} created by {}", post.id, author.username);

        Ok(PostView {
            id: post.id,
            author: author.clone(),
            group: group.map(|g| GroupRef {
                slug: g.slug,
                title: g.title,
            }),
            text: post.text,
            image_key: post.image_key,
            created_at: post.created_at,
        })
    }

    /// The post plus its comments. `NotFound` for unknown ids.
    pub async fn detail(&self, post_id: Uuid) -> Result<PostDetail> {
        let post = self
            .posts
            .find(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        let comments = self.comments.list_for_post(post_id).await?;

        Ok(PostDetail { post, comments })
    }

    /// Replace the editable fields of a post. Only the author may edit;
    /// anyone else gets `Forbidden` and the content stays untouched.
    pub async fn edit(&self, viewer: &Viewer, post_id: Uuid, input: PostInput) -> Result<PostView> {
        let author = viewer.require_author()?;

        let existing = self
            .posts
            .find(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if existing.author.id != author.id {
            return Err(AppError::Forbidden(
                "only the author can edit a post".into(),
            ));
        }

        if input.text.trim().is_empty() {
            return Err(AppError::InvalidInput("post text must not be blank".into()));
        }

        let group = self.resolve_group(input.group_slug.as_deref()).await?;

        let updated = self
            .posts
            .update(
                post_id,
                PostChanges {
                    group_id: group.as_ref().map(|g| g.id),
                    text: input.text,
                    image_key: input.image_key,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        Ok(PostView {
            id: updated.id,
            author: existing.author,
            group: group.map(|g| GroupRef {
                slug: g.slug,
                title: g.title,
            }),
            text: updated.text,
            image_key: updated.image_key,
            created_at: updated.created_at,
        })
    }

    /// Delete a post. Author-only. The global-feed cache is left alone:
    /// the deleted post stays visible there until TTL or an explicit clear.
    pub async fn delete(&self, viewer: &Viewer, post_id: Uuid) -> Result<()> {
        let author = viewer.require_author()?;

        let existing = self
            .posts
            .find(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if existing.author.id != author.id {
            return Err(AppError::Forbidden(
                "only the author can delete a post".into(),
            ));
        }

        self.posts.delete(post_id).await?;
        debug!("Post {} deleted by {}", post_id, author.username);

        Ok(())
    }
}
