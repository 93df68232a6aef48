/// Timeline Service Library
///
/// Serves the Gazette reading surfaces: the global feed, group feeds,
/// author profile feeds, and the personalized following feed, together
/// with post, comment, and follow management.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and the route table
/// - `models`: Entities, read models, and the viewer identity
/// - `services`: Business logic layer over the repositories
/// - `repository`: PostgreSQL access behind per-entity traits
/// - `cache`: Redis-backed cache for the global feed
/// - `pagination`: Page-number slicing shared by every feed
/// - `middleware`: Viewer identity extraction and request timing
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
