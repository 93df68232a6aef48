//! Business logic: feed composition, the follow graph, and post/comment
//! write paths. Services own the authorization and not-found semantics;
//! repositories stay mechanical.

mod comments;
mod feeds;
mod follows;
mod posts;

pub use comments::CommentService;
pub use feeds::{FeedService, GroupFeed, ProfileFeed};
pub use follows::FollowService;
pub use posts::{PostDetail, PostInput, PostService};
