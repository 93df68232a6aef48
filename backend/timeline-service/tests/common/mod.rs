//! In-memory repository and cache implementations for the test suites.
//!
//! One `MemoryStore` stands in for the database and implements every
//! repository trait, so cross-entity effects (cascade deletes, group
//! detachment) behave like the real schema without a running Postgres.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use timeline_service::cache::{CachedGlobalFeed, GlobalFeedCache};
use timeline_service::error::{AppError, Result};
use timeline_service::handlers::AppState;
use timeline_service::models::{
    Author, Comment, CommentView, Follow, Group, GroupChanges, GroupRef, NewComment, NewGroup,
    NewPost, Post, PostChanges, PostView, Viewer,
};
use timeline_service::repository::{
    AuthorRepository, CommentRepository, FollowRepository, GroupRepository, PostRepository,
};

pub const PAGE_SIZE: u32 = 10;

#[derive(Default)]
struct MemoryState {
    authors: HashMap<Uuid, Author>,
    groups: HashMap<Uuid, Group>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    follows: Vec<Follow>,
}

impl MemoryState {
    fn post_view(&self, post: &Post) -> Option<PostView> {
        let author = self.authors.get(&post.author_id)?.clone();
        let group = post
            .group_id
            .and_then(|id| self.groups.get(&id))
            .map(|g| GroupRef {
                slug: g.slug.clone(),
                title: g.title.clone(),
            });

        Some(PostView {
            id: post.id,
            author,
            group,
            text: post.text.clone(),
            image_key: post.image_key.clone(),
            created_at: post.created_at,
        })
    }

    fn post_views<'a, I>(&self, posts: I) -> Vec<PostView>
    where
        I: Iterator<Item = &'a Post>,
    {
        let mut selected: Vec<&Post> = posts.collect();
        selected.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        selected
            .into_iter()
            .filter_map(|p| self.post_view(p))
            .collect()
    }
}

/// Shared fake database. Cloning shares the underlying state.
#[derive(Default, Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub async fn seed_author(&self, username: &str) -> Author {
        let author = Author {
            id: Uuid::new_v4(),
            username: username.to_string(),
        };
        let mut state = self.state.write().await;
        state.authors.insert(author.id, author.clone());
        author
    }

    pub async fn seed_group(&self, slug: &str, title: &str) -> Group {
        let group = Group {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: format!("Posts about {}", title),
            created_at: Utc::now(),
        };
        let mut state = self.state.write().await;
        state.groups.insert(group.id, group.clone());
        group
    }

    /// Insert a post with an explicit timestamp so ordering tests are
    /// deterministic.
    pub async fn seed_post(
        &self,
        author: &Author,
        group: Option<&Group>,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Post {
        let post = Post {
            id: Uuid::new_v4(),
            author_id: author.id,
            group_id: group.map(|g| g.id),
            text: text.to_string(),
            image_key: None,
            created_at,
        };
        let mut state = self.state.write().await;
        state.posts.insert(post.id, post.clone());
        post
    }

    pub async fn post(&self, id: Uuid) -> Option<Post> {
        self.state.read().await.posts.get(&id).cloned()
    }

    pub async fn author_by_username(&self, username: &str) -> Option<Author> {
        let state = self.state.read().await;
        state
            .authors
            .values()
            .find(|a| a.username == username)
            .cloned()
    }

    pub async fn post_count(&self) -> usize {
        self.state.read().await.posts.len()
    }

    pub async fn comment_count(&self) -> usize {
        self.state.read().await.comments.len()
    }

    pub async fn follow_count(&self) -> usize {
        self.state.read().await.follows.len()
    }
}

#[async_trait]
impl AuthorRepository for MemoryStore {
    async fn upsert(&self, author: &Author) -> Result<()> {
        let mut state = self.state.write().await;
        state.authors.insert(author.id, author.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Author>> {
        Ok(self.author_by_username(username).await)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>> {
        Ok(self.state.read().await.authors.get(&id).cloned())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, new: NewGroup) -> Result<Group> {
        let group = Group {
            id: Uuid::new_v4(),
            title: new.title,
            slug: new.slug,
            description: new.description,
            created_at: Utc::now(),
        };
        let mut state = self.state.write().await;
        state.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn update(&self, id: Uuid, changes: GroupChanges) -> Result<Option<Group>> {
        let mut state = self.state.write().await;
        Ok(state.groups.get_mut(&id).map(|group| {
            group.title = changes.title;
            group.description = changes.description;
            group.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let removed = state.groups.remove(&id).is_some();
        if removed {
            // mirrors posts.group_id ON DELETE SET NULL
            for post in state.posts.values_mut() {
                if post.group_id == Some(id) {
                    post.group_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let state = self.state.read().await;
        Ok(state.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>> {
        let state = self.state.read().await;
        let mut groups: Vec<Group> = state.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, new: NewPost) -> Result<Post> {
        let post = Post {
            id: Uuid::new_v4(),
            author_id: new.author_id,
            group_id: new.group_id,
            text: new.text,
            image_key: new.image_key,
            created_at: Utc::now(),
        };
        let mut state = self.state.write().await;
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        Ok(state.posts.get_mut(&id).map(|post| {
            post.group_id = changes.group_id;
            post.text = changes.text;
            post.image_key = changes.image_key;
            post.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let removed = state.posts.remove(&id).is_some();
        if removed {
            // mirrors comments.post_id ON DELETE CASCADE
            state.comments.retain(|_, c| c.post_id != id);
        }
        Ok(removed)
    }

    async fn find(&self, id: Uuid) -> Result<Option<PostView>> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).and_then(|p| state.post_view(p)))
    }

    async fn list_all(&self) -> Result<Vec<PostView>> {
        let state = self.state.read().await;
        Ok(state.post_views(state.posts.values()))
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PostView>> {
        let state = self.state.read().await;
        Ok(state.post_views(state.posts.values().filter(|p| p.group_id == Some(group_id))))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<PostView>> {
        let state = self.state.read().await;
        Ok(state.post_views(state.posts.values().filter(|p| p.author_id == author_id)))
    }

    async fn list_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<PostView>> {
        let state = self.state.read().await;
        Ok(state.post_views(
            state
                .posts
                .values()
                .filter(|p| author_ids.contains(&p.author_id)),
        ))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, new: NewComment) -> Result<Comment> {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: new.post_id,
            author_id: new.author_id,
            text: new.text,
            created_at: Utc::now(),
        };
        let mut state = self.state.write().await;
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>> {
        let state = self.state.read().await;
        let mut comments: Vec<&Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(comments
            .into_iter()
            .filter_map(|c| {
                let author = state.authors.get(&c.author_id)?.clone();
                Some(CommentView {
                    id: c.id,
                    author,
                    text: c.text.clone(),
                    created_at: c.created_at,
                })
            })
            .collect())
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn create(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        if user_id == author_id {
            // the follows_no_self check would reject this row
            return Err(AppError::Internal(
                "self follow violates follows_no_self".to_string(),
            ));
        }
        let mut state = self.state.write().await;
        let exists = state
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id);
        if exists {
            return Ok(false);
        }
        state.follows.push(Follow {
            id: Uuid::new_v4(),
            user_id,
            author_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.follows.len();
        state
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(state.follows.len() < before)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let state = self.state.read().await;
        let mut edges: Vec<&Follow> = state
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(edges.into_iter().map(|f| f.author_id).collect())
    }

    async fn followers_of(&self, author_id: Uuid) -> Result<Vec<Uuid>> {
        let state = self.state.read().await;
        let mut edges: Vec<&Follow> = state
            .follows
            .iter()
            .filter(|f| f.author_id == author_id)
            .collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(edges.into_iter().map(|f| f.user_id).collect())
    }
}

/// Process-local cache with real expiry. A zero TTL makes every entry
/// stale on arrival, which disables caching without any sleeping.
pub struct MemoryGlobalFeedCache {
    entries: RwLock<HashMap<u32, (CachedGlobalFeed, Instant)>>,
    ttl: Duration,
}

impl MemoryGlobalFeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn cached_pages(&self) -> Vec<u32> {
        let entries = self.entries.read().await;
        let mut pages: Vec<u32> = entries.keys().copied().collect();
        pages.sort_unstable();
        pages
    }
}

#[async_trait]
impl GlobalFeedCache for MemoryGlobalFeedCache {
    async fn get(&self, page_number: u32) -> Result<Option<CachedGlobalFeed>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&page_number)
            .filter(|(_, stored)| stored.elapsed() < self.ttl)
            .map(|(feed, _)| feed.clone()))
    }

    async fn set(&self, page_number: u32, feed: &CachedGlobalFeed) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(page_number, (feed.clone(), Instant::now()));
        Ok(())
    }

    async fn invalidate(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// Cache whose every call fails, for exercising the degraded path.
pub struct FailingGlobalFeedCache;

#[async_trait]
impl GlobalFeedCache for FailingGlobalFeedCache {
    async fn get(&self, _page_number: u32) -> Result<Option<CachedGlobalFeed>> {
        Err(AppError::Cache("connection refused".to_string()))
    }

    async fn set(&self, _page_number: u32, _feed: &CachedGlobalFeed) -> Result<()> {
        Err(AppError::Cache("connection refused".to_string()))
    }

    async fn invalidate(&self) -> Result<()> {
        Err(AppError::Cache("connection refused".to_string()))
    }
}

pub struct TestApp {
    pub store: MemoryStore,
    pub cache: Arc<MemoryGlobalFeedCache>,
    pub state: AppState,
}

pub fn build_state(store: &MemoryStore, cache: Arc<dyn GlobalFeedCache>, page_size: u32) -> AppState {
    AppState::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        cache,
        page_size,
    )
}

pub fn build_app(page_size: u32, cache_ttl: Duration) -> TestApp {
    let store = MemoryStore::default();
    let cache = Arc::new(MemoryGlobalFeedCache::new(cache_ttl));
    let state = build_state(&store, cache.clone(), page_size);
    TestApp {
        store,
        cache,
        state,
    }
}

pub fn viewer_for(author: &Author) -> Viewer {
    Viewer::Authenticated(author.clone())
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    Utc::now() - chrono::Duration::minutes(minutes)
}
