/// Post handlers - create, read, edit, and delete endpoints.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::Viewer;
use crate::services::PostInput;

use super::{post_detail_path, profile_feed_path, see_other, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct PostRequest {
    #[validate(length(min = 1, max = 10000))]
    pub text: String,
    pub group: Option<String>,
    pub image_key: Option<String>,
}

impl PostRequest {
    fn into_input(self) -> PostInput {
        PostInput {
            text: self.text,
            group_slug: self.group,
            image_key: self.image_key,
        }
    }
}

/// POST /api/v1/posts
///
/// Lands the viewer back on their own feed once the post is stored.
pub async fn create_post(
    state: web::Data<AppState>,
    viewer: Viewer,
    req: web::Json<PostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let username = viewer.require_author()?.username.clone();
    state
        .posts
        .create(&viewer, req.into_inner().into_input())
        .await?;
    Ok(see_other(profile_feed_path(&username)))
}

/// GET /api/v1/posts/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let detail = state.posts.detail(*post_id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// PATCH /api/v1/posts/{post_id}
///
/// Anyone but the author is bounced back to the post page instead of
/// receiving an error body.
pub async fn update_post(
    state: web::Data<AppState>,
    viewer: Viewer,
    post_id: web::Path<Uuid>,
    req: web::Json<PostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    match state
        .posts
        .edit(&viewer, *post_id, req.into_inner().into_input())
        .await
    {
        Ok(view) => Ok(HttpResponse::Ok().json(view)),
        Err(AppError::Forbidden(_)) => Ok(see_other(post_detail_path(*post_id))),
        Err(err) => Err(err),
    }
}

/// DELETE /api/v1/posts/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    viewer: Viewer,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match state.posts.delete(&viewer, *post_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(AppError::Forbidden(_)) => Ok(see_other(post_detail_path(*post_id))),
        Err(err) => Err(err),
    }
}
