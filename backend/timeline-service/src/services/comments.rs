//! Comment creation. Comments are append-only; listing happens through the
//! post detail view.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CommentView, NewComment, Viewer};
use crate::repository::{AuthorRepository, CommentRepository, PostRepository};

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    authors: Arc<dyn AuthorRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        authors: Arc<dyn AuthorRepository>,
    ) -> Self {
        Self {
            comments,
            posts,
            authors,
        }
    }

    /// Add a comment to a post as the authenticated viewer.
    pub async fn add(&self, viewer: &Viewer, post_id: Uuid, text: String) -> Result<CommentView> {
        let author = viewer.require_author()?;

        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "comment text must not be blank".into(),
            ));
        }

        let post = self
            .posts
            .find(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        self.authors.upsert(author).await?;

        let comment = self
            .comments
            .create(NewComment {
                post_id: post.id,
                author_id: author.id,
                text,
            })
            .await?;

        debug!("Comment {} added to post {}", comment.id, post.id);

        Ok(CommentView {
            id: comment.id,
            author: author.clone(),
            text: comment.text,
            created_at: comment.created_at,
        })
    }
}
