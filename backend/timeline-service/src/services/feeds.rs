//! Feed composition: the four read views over posts.
//!
//! Every feed fetches its scoped, ordered post set and hands it to the
//! pagination module. Only the global feed touches the cache layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::{CachedGlobalFeed, GlobalFeedCache};
use crate::error::{AppError, Result};
use crate::models::{Author, Group, PostView, Viewer};
use crate::pagination::{paginate, Page};
use crate::repository::{AuthorRepository, GroupRepository, PostRepository};
use crate::services::FollowService;

/// Group feed: the page of posts plus the group descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<PostView>,
}

/// Profile feed: the page of posts plus the author and whether the viewer
/// follows them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFeed {
    pub author: Author,
    pub is_following: bool,
    pub page: Page<PostView>,
}

pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    authors: Arc<dyn AuthorRepository>,
    follow_graph: Arc<FollowService>,
    cache: Arc<dyn GlobalFeedCache>,
    page_size: u32,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        authors: Arc<dyn AuthorRepository>,
        follow_graph: Arc<FollowService>,
        cache: Arc<dyn GlobalFeedCache>,
        page_size: u32,
    ) -> Self {
        Self {
            posts,
            groups,
            authors,
            follow_graph,
            cache,
            page_size,
        }
    }

    /// Global feed: every post, newest first, identical for every viewer.
    ///
    /// Serves the cached rendering when present. Entity writes never
    /// invalidate these entries, so a just-deleted post can linger and a
    /// just-created one can lag until the TTL passes or `invalidate_global`
    /// is called. Cache backend failures degrade to a store read.
    pub async fn global(&self, page_number: u32) -> Result<Page<PostView>> {
        match self.cache.get(page_number).await {
            Ok(Some(cached)) => return Ok(cached.into_page()),
            Ok(None) => {}
            Err(e) => warn!("Global feed cache read failed, using store: {}", e),
        }

        let posts = self.posts.list_all().await?;
        let page = paginate(posts, self.page_size, page_number)?;

        let entry = CachedGlobalFeed::from_page(&page);
        if let Err(e) = self.cache.set(page_number, &entry).await {
            warn!("Global feed cache write failed: {}", e);
        }

        Ok(page)
    }

    /// Posts filed under the group with `slug`. `NotFound` when the slug
    /// does not resolve.
    pub async fn group(&self, slug: &str, page_number: u32) -> Result<GroupFeed> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;

        let posts = self.posts.list_by_group(group.id).await?;
        let page = paginate(posts, self.page_size, page_number)?;

        Ok(GroupFeed { group, page })
    }

    /// Posts by `username`, with `is_following` derived for the viewer.
    pub async fn profile(
        &self,
        username: &str,
        viewer: &Viewer,
        page_number: u32,
    ) -> Result<ProfileFeed> {
        let author = self
            .authors
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("author '{}'", username)))?;

        let is_following = match viewer.author() {
            Some(user) => self.follow_graph.is_following(user.id, author.id).await?,
            None => false,
        };

        let posts = self.posts.list_by_author(author.id).await?;
        let page = paginate(posts, self.page_size, page_number)?;

        Ok(ProfileFeed {
            author,
            is_following,
            page,
        })
    }

    /// Posts by the authors the viewer follows. Requires authentication; an
    /// empty follow set is an empty feed, not an error.
    pub async fn following(&self, viewer: &Viewer, page_number: u32) -> Result<Page<PostView>> {
        let user = viewer.require_author()?;

        let followed = self.follow_graph.following_of(user.id).await?;
        if followed.is_empty() {
            return paginate(Vec::new(), self.page_size, page_number);
        }

        let posts = self.posts.list_by_authors(&followed).await?;
        paginate(posts, self.page_size, page_number)
    }

    /// Drop every cached global-feed page. Operational hook; no write path
    /// calls this.
    pub async fn invalidate_global(&self) -> Result<()> {
        self.cache.invalidate().await
    }
}
