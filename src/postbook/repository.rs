//! # Post Repository
//!
//! [`PostRepository`] owns the post collection and enforces its invariants:
//!
//! - ids are unique; new posts get a fresh [`PostId`]
//! - the list is newest-first by insertion: new posts are prepended, edits
//!   keep their position
//! - `excerpt` is recomputed from `content` on every save
//! - tags are trimmed, non-empty and deduplicated
//! - `created_at` is set once; `updated_at` strictly increases on every save
//!
//! ## Persistence
//!
//! The snapshot is read once in [`PostRepository::open`]. From then on the
//! in-memory collection is the source of truth for the session, and every
//! mutation writes the whole collection back under a single key before
//! returning. A failed write does not undo the mutation: it is handed back in
//! [`Committed::storage_error`] and the next mutation rewrites the snapshot.
//!
//! A snapshot that cannot be loaded is never overwritten. If its content is
//! unreadable it is moved aside through [`PersistentStore::set_aside`] before
//! the session starts empty. If it could not be read at all, or could not be
//! moved, the repository is read-only for the session and every mutation
//! reports a storage error instead of writing.

use crate::config::PostbookConfig;
use crate::error::{PostError, Result};
use crate::model::{make_excerpt, normalize_tags, Draft, Post, PostId};
use crate::store::PersistentStore;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashSet;

/// The result of an operation whose in-memory effect succeeded, together with
/// the outcome of persisting it.
#[derive(Debug)]
pub struct Committed<T> {
    pub value: T,
    pub storage_error: Option<PostError>,
}

impl<T> Committed<T> {
    fn new(value: T, storage_error: Option<PostError>) -> Self {
        Self {
            value,
            storage_error,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.storage_error.is_none()
    }
}

/// Search and tag criteria for [`PostRepository::filter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Case-insensitive substring matched against title and content.
    pub search: Option<String>,
    /// Exact tag the post must carry.
    pub tag: Option<String>,
}

impl PostFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            tag: None,
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            search: None,
            tag: Some(tag.into()),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                post.title.to_lowercase().contains(&term)
                    || post.content.to_lowercase().contains(&term)
            }
        };
        let matches_tag = match self.tag.as_deref() {
            None | Some("") => true,
            Some(tag) => post.has_tag(tag),
        };
        matches_search && matches_tag
    }
}

pub struct PostRepository<S: PersistentStore> {
    store: S,
    key: String,
    excerpt_length: usize,
    posts: Vec<Post>,
    dirty: bool,
    set_aside: Option<String>,
    read_only: bool,
}

impl<S: PersistentStore> PostRepository<S> {
    /// Loads the post collection from `store`.
    ///
    /// Never fails: if the snapshot cannot be read the repository starts
    /// empty and the error is returned as a storage warning. See the module
    /// docs for what happens to the unreadable snapshot.
    pub fn open(store: S, config: &PostbookConfig) -> Committed<Self> {
        let key = config.storage_key.clone();
        let mut set_aside = None;
        let mut read_only = false;

        let (posts, storage_error) = match load_posts(&store, &key) {
            Ok(posts) => (posts, None),
            Err(e) => {
                log::warn!("could not load posts, starting empty: {}", e);
                match &e {
                    PostError::Io(_) => read_only = true,
                    _ => match store.set_aside(&key) {
                        Ok(moved) => set_aside = moved,
                        Err(aside_err) => {
                            log::error!("could not set unreadable snapshot aside: {}", aside_err);
                            read_only = true;
                        }
                    },
                }
                (Vec::new(), Some(e))
            }
        };
        if read_only {
            log::warn!("saving is disabled for this session");
        }
        log::debug!("opened repository with {} posts", posts.len());

        let repo = Self {
            store,
            key,
            excerpt_length: config.excerpt_length,
            posts,
            dirty: false,
            set_aside,
            read_only,
        };
        Committed::new(repo, storage_error)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Where an unreadable snapshot was moved when the repository opened.
    pub fn set_aside_snapshot(&self) -> Option<&str> {
        self.set_aside.as_deref()
    }

    /// True when the snapshot could not be loaded or moved, so nothing will
    /// be written this session.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// All posts, newest first.
    pub fn list(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn find(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| &p.id == id)
    }

    pub fn position(&self, id: &PostId) -> Option<usize> {
        self.posts.iter().position(|p| &p.id == id)
    }

    /// True when the last write to the store failed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Creates or fully replaces a post.
    ///
    /// A draft whose id matches an existing post replaces it in place;
    /// anything else becomes a new post at the front of the list.
    pub fn save(&mut self, draft: Draft) -> Result<Committed<Post>> {
        let title = draft.title.trim();
        let content = draft.content.trim();
        if title.is_empty() {
            return Err(PostError::Validation("Title cannot be empty".into()));
        }
        if content.is_empty() {
            return Err(PostError::Validation("Content cannot be empty".into()));
        }

        let excerpt = make_excerpt(content, self.excerpt_length);
        let tags = normalize_tags(&draft.tags);
        let existing = draft.id.as_ref().and_then(|id| self.position(id));

        let saved = match existing {
            Some(pos) => {
                let post = &mut self.posts[pos];
                post.title = title.to_string();
                post.content = content.to_string();
                post.excerpt = excerpt;
                post.tags = tags;
                post.updated_at = next_timestamp(post.updated_at);
                log::info!("updated post {}", post.id);
                post.clone()
            }
            None => {
                let now = Utc::now();
                let post = Post {
                    id: self.fresh_id(),
                    title: title.to_string(),
                    content: content.to_string(),
                    excerpt,
                    tags,
                    created_at: now,
                    updated_at: now,
                };
                log::info!("created post {}", post.id);
                self.posts.insert(0, post.clone());
                post
            }
        };

        let storage_error = self.persist();
        Ok(Committed::new(saved, storage_error))
    }

    /// Removes a post permanently.
    pub fn delete(&mut self, id: &PostId) -> Result<Committed<Post>> {
        let pos = self
            .position(id)
            .ok_or_else(|| PostError::NotFound(id.clone()))?;
        let removed = self.posts.remove(pos);
        log::info!("deleted post {}", removed.id);

        let storage_error = self.persist();
        Ok(Committed::new(removed, storage_error))
    }

    /// Posts matching `filter`, in list order.
    pub fn filter(&self, filter: &PostFilter) -> Vec<&Post> {
        self.posts.iter().filter(|p| filter.matches(p)).collect()
    }

    /// Every tag in use, sorted and deduplicated.
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .posts
            .iter()
            .flat_map(|p| p.tags.iter().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        tags.sort();
        tags
    }

    fn fresh_id(&self) -> PostId {
        loop {
            let id = PostId::generate();
            if self.find(&id).is_none() {
                return id;
            }
        }
    }

    /// Writes the whole collection. Returns the error instead of propagating
    /// it so the in-memory change survives a failed write.
    fn persist(&mut self) -> Option<PostError> {
        if self.read_only {
            self.dirty = true;
            return Some(PostError::Storage(format!(
                "Refusing to overwrite the '{}' snapshot that failed to load",
                self.key
            )));
        }

        let result = serde_json::to_value(&self.posts)
            .map_err(PostError::Serialization)
            .and_then(|value| self.store.write(&self.key, &value));

        match result {
            Ok(()) => {
                self.dirty = false;
                None
            }
            Err(e) => {
                log::warn!("failed to persist {} posts: {}", self.posts.len(), e);
                self.dirty = true;
                Some(e)
            }
        }
    }
}

/// `updated_at` must strictly increase even if the clock has not moved.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

fn load_posts<S: PersistentStore>(store: &S, key: &str) -> Result<Vec<Post>> {
    let items = match store.read(key)? {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(PostError::Storage(format!(
                "Expected a JSON array under '{}', found {}",
                key,
                json_kind(&other)
            )))
        }
    };

    let mut seen = HashSet::new();
    let mut posts = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Post>(item) {
            Ok(post) if seen.insert(post.id.clone()) => posts.push(repair(post)),
            Ok(post) => log::warn!("skipping duplicate post id {} at index {}", post.id, i),
            Err(e) => log::warn!("skipping unreadable post record at index {}: {}", i, e),
        }
    }
    Ok(posts)
}

/// Brings a decoded record back in line with the invariants `save` keeps.
fn repair(mut post: Post) -> Post {
    let tags = normalize_tags(&post.tags);
    if tags != post.tags {
        log::warn!("normalized tags of post {}", post.id);
        post.tags = tags;
    }
    if post.updated_at < post.created_at {
        log::warn!("post {} was updated before it was created; clamping", post.id);
        post.updated_at = post.created_at;
    }
    post
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
