//! Repository interfaces for the entity store, with PostgreSQL
//! implementations. One module per entity.

mod authors;
mod comments;
mod follows;
mod groups;
mod posts;

pub use authors::{AuthorRepository, PgAuthorRepository};
pub use comments::{CommentRepository, PgCommentRepository};
pub use follows::{FollowRepository, PgFollowRepository};
pub use groups::{GroupRepository, PgGroupRepository};
pub use posts::{PgPostRepository, PostRepository};
