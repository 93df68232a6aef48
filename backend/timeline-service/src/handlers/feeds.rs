/// Feed handlers - the four read surfaces of the timeline.
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{PostView, Viewer};
use crate::pagination::resolve_page;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    page: Option<String>,
}

impl FeedQuery {
    /// A missing or unparseable value lands on the first page.
    fn page_number(&self) -> u32 {
        resolve_page(self.page.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub slug: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct GroupFeedResponse {
    pub group: GroupSummary,
    pub items: Vec<PostView>,
    pub page_number: u32,
    pub total_pages: u32,
}

#[derive(Debug, Serialize)]
pub struct ProfileFeedResponse {
    pub author: AuthorSummary,
    pub is_following: bool,
    pub items: Vec<PostView>,
    pub page_number: u32,
    pub total_pages: u32,
}

/// GET /api/v1/feed
pub async fn global_feed(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let page = state.feeds.global(query.page_number()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/v1/feed/following
pub async fn following_feed(
    state: web::Data<AppState>,
    viewer: Viewer,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let page = state.feeds.following(&viewer, query.page_number()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/v1/groups/{slug}/feed
pub async fn group_feed(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let feed = state.feeds.group(&slug, query.page_number()).await?;
    Ok(HttpResponse::Ok().json(GroupFeedResponse {
        group: GroupSummary {
            slug: feed.group.slug,
            title: feed.group.title,
            description: feed.group.description,
        },
        items: feed.page.items,
        page_number: feed.page.page_number,
        total_pages: feed.page.total_pages,
    }))
}

/// GET /api/v1/profiles/{username}/feed
pub async fn profile_feed(
    state: web::Data<AppState>,
    viewer: Viewer,
    username: web::Path<String>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let feed = state
        .feeds
        .profile(&username, &viewer, query.page_number())
        .await?;
    Ok(HttpResponse::Ok().json(ProfileFeedResponse {
        author: AuthorSummary {
            id: feed.author.id,
            username: feed.author.username,
        },
        is_following: feed.is_following,
        items: feed.page.items,
        page_number: feed.page.page_number,
        total_pages: feed.page.total_pages,
    }))
}
