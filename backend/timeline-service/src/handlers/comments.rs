/// Comment handlers.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::models::Viewer;

use super::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}

/// POST /api/v1/posts/{post_id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    viewer: Viewer,
    post_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let comment = state
        .comments
        .add(&viewer, *post_id, req.into_inner().text)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}
