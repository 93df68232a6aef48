//! Time-boxed cache of the rendered global feed.
//!
//! The global feed is viewer-independent, so pages are cached under a fixed
//! key per page number (`{prefix}:{page}`), never per viewer. Entries live
//! for a short TTL; nothing invalidates them on entity writes. A deleted
//! post may keep showing up until the TTL runs out or `invalidate` is called
//! explicitly, and a new post stays invisible for the same window.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::error::{AppError, Result};
use crate::models::PostView;
use crate::pagination::Page;

/// Cached rendering of one global-feed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedGlobalFeed {
    pub items: Vec<PostView>,
    pub page_number: u32,
    pub total_pages: u32,
    pub cached_at: DateTime<Utc>,
}

impl CachedGlobalFeed {
    pub fn from_page(page: &Page<PostView>) -> Self {
        Self {
            items: page.items.clone(),
            page_number: page.page_number,
            total_pages: page.total_pages,
            cached_at: Utc::now(),
        }
    }

    pub fn into_page(self) -> Page<PostView> {
        Page {
            items: self.items,
            page_number: self.page_number,
            total_pages: self.total_pages,
        }
    }
}

/// Cache contract consumed by the feed composer. Injected so staleness
/// behavior stays test-controllable.
#[async_trait]
pub trait GlobalFeedCache: Send + Sync {
    async fn get(&self, page_number: u32) -> Result<Option<CachedGlobalFeed>>;

    async fn set(&self, page_number: u32, feed: &CachedGlobalFeed) -> Result<()>;

    /// Drop every cached global-feed page.
    async fn invalidate(&self) -> Result<()>;
}

/// Redis-backed cache shared across server processes.
#[derive(Clone)]
pub struct RedisGlobalFeedCache {
    redis: ConnectionManager,
    key_prefix: String,
    ttl: Duration,
}

fn page_key(prefix: &str, page_number: u32) -> String {
    format!("{}:{}", prefix, page_number)
}

impl RedisGlobalFeedCache {
    pub fn new(redis: ConnectionManager, key_prefix: String, ttl_secs: u64) -> Self {
        Self {
            redis,
            key_prefix,
            ttl: Duration::from_secs(ttl_secs),
        }
    }
}

#[async_trait]
impl GlobalFeedCache for RedisGlobalFeedCache {
    async fn get(&self, page_number: u32) -> Result<Option<CachedGlobalFeed>> {
        let key = page_key(&self.key_prefix, page_number);
        let mut conn = self.redis.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(data)) => {
                debug!("Global feed cache HIT for page {}", page_number);
                serde_json::from_str::<CachedGlobalFeed>(&data)
                    .map(Some)
                    .map_err(|e| {
                        error!("Failed to deserialize cached global feed: {}", e);
                        AppError::Internal(format!("cache deserialization error: {}", e))
                    })
            }
            Ok(None) => {
                debug!("Global feed cache MISS for page {}", page_number);
                Ok(None)
            }
            Err(e) => {
                warn!("Redis read error for global feed cache: {}", e);
                Err(AppError::Cache(e.to_string()))
            }
        }
    }

    async fn set(&self, page_number: u32, feed: &CachedGlobalFeed) -> Result<()> {
        let key = page_key(&self.key_prefix, page_number);

        let data = serde_json::to_string(feed).map_err(|e| {
            error!("Failed to serialize global feed for cache: {}", e);
            AppError::Internal(format!("cache serialization error: {}", e))
        })?;

        // spread expiry a little so pages do not all refill at once
        let jitter = (rand::random::<u32>() % 10) as f64 / 100.0;
        let jitter_secs = (self.ttl.as_secs_f64() * jitter).round() as u64;
        let final_ttl = self.ttl + Duration::from_secs(jitter_secs);

        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(&key, data, final_ttl.as_secs())
            .await
            .map_err(|e| {
                warn!("Failed to write global feed cache: {}", e);
                AppError::Cache(e.to_string())
            })?;

        debug!(
            "Global feed cache WRITE for page {} ({} items) with TTL {:?}",
            page_number,
            feed.items.len(),
            final_ttl
        );

        Ok(())
    }

    async fn invalidate(&self) -> Result<()> {
        // SCAN is non-blocking unlike KEYS
        let pattern = format!("{}:*", self.key_prefix);
        let mut cursor: u64 = 0;
        let mut total_deleted = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut self.redis.clone())
                .await
                .map_err(|e| {
                    warn!("Redis SCAN failed for {}: {}", pattern, e);
                    AppError::Cache(e.to_string())
                })?;

            if !keys.is_empty() {
                redis::cmd("DEL")
                    .arg(&keys)
                    .query_async::<_, ()>(&mut self.redis.clone())
                    .await
                    .map_err(|e| {
                        warn!("Redis DEL failed: {}", e);
                        AppError::Cache(e.to_string())
                    })?;
                total_deleted += keys.len();
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!("Global feed cache INVALIDATE ({} keys)", total_deleted);

        Ok(())
    }
}
