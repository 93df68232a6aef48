//! HTTP layer: handler state, route table, and the endpoint functions.

mod comments;
mod feeds;
mod follows;
mod health;
mod posts;

pub use health::{health_summary, liveness_check, readiness_summary, HealthState};

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::cache::GlobalFeedCache;
use crate::repository::{
    AuthorRepository, CommentRepository, FollowRepository, GroupRepository, PostRepository,
};
use crate::services::{CommentService, FeedService, FollowService, PostService};

/// Shared handler state. Services are built once at startup and cloned
/// into workers through `web::Data`.
pub struct AppState {
    pub feeds: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub follows: Arc<FollowService>,
}

impl AppState {
    pub fn new(
        authors: Arc<dyn AuthorRepository>,
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        follows: Arc<dyn FollowRepository>,
        cache: Arc<dyn GlobalFeedCache>,
        page_size: u32,
    ) -> Self {
        let follow_service = Arc::new(FollowService::new(follows, authors.clone()));
        let feed_service = Arc::new(FeedService::new(
            posts.clone(),
            groups.clone(),
            authors.clone(),
            follow_service.clone(),
            cache,
            page_size,
        ));
        let post_service = Arc::new(PostService::new(
            posts.clone(),
            groups,
            authors.clone(),
            comments.clone(),
        ));
        let comment_service = Arc::new(CommentService::new(comments, posts, authors));

        Self {
            feeds: feed_service,
            posts: post_service,
            comments: comment_service,
            follows: follow_service,
        }
    }
}

/// Registers every route that lives under the `/api/v1` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/feed")
            .route("", web::get().to(feeds::global_feed))
            .route("/following", web::get().to(feeds::following_feed)),
    )
    .service(web::scope("/groups").route("/{slug}/feed", web::get().to(feeds::group_feed)))
    .service(
        web::scope("/posts")
            .service(web::resource("").route(web::post().to(posts::create_post)))
            .service(
                web::resource("/{post_id}")
                    .route(web::get().to(posts::get_post))
                    .route(web::patch().to(posts::update_post))
                    .route(web::delete().to(posts::delete_post)),
            )
            .route("/{post_id}/comments", web::post().to(comments::add_comment)),
    )
    .service(
        web::scope("/profiles")
            .route("/{username}/feed", web::get().to(feeds::profile_feed))
            .service(
                web::resource("/{username}/follow")
                    .route(web::post().to(follows::follow_author))
                    .route(web::delete().to(follows::unfollow_author)),
            ),
    );
}

fn profile_feed_path(username: &str) -> String {
    format!("/api/v1/profiles/{}/feed", username)
}

fn post_detail_path(post_id: Uuid) -> String {
    format!("/api/v1/posts/{}", post_id)
}

fn see_other(location: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
