/// Follow handlers - subscribing to and dropping an author.
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::models::Viewer;

use super::{profile_feed_path, see_other, AppState};

/// POST /api/v1/profiles/{username}/follow
pub async fn follow_author(
    state: web::Data<AppState>,
    viewer: Viewer,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    state.follows.follow(&viewer, &username).await?;
    Ok(see_other(profile_feed_path(&username)))
}

/// DELETE /api/v1/profiles/{username}/follow
pub async fn unfollow_author(
    state: web::Data<AppState>,
    viewer: Viewer,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    state.follows.unfollow(&viewer, &username).await?;
    Ok(see_other(profile_feed_path(&username)))
}
