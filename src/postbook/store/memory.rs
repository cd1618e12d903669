use super::PersistentStore;
use crate::error::{PostError, Result};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;

/// In-memory store for tests.
///
/// Uses `RefCell` for interior mutability since postbook is single-threaded.
#[derive(Default)]
pub struct InMemoryStore {
    values: RefCell<HashMap<String, Value>>,
    simulate_read_error: Cell<bool>,
    simulate_write_error: Cell<bool>,
    writes: Cell<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without counting it as a write.
    pub fn with_value(self, key: &str, value: Value) -> Self {
        self.values.borrow_mut().insert(key.to_string(), value);
        self
    }

    /// Make every read fail with an IO error, as an unreadable file would.
    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.set(simulate);
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }
}

impl PersistentStore for InMemoryStore {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        if self.simulate_read_error.get() {
            return Err(PostError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Simulated read error",
            )));
        }
        Ok(self.values.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &Value) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(PostError::Storage("Simulated write error".to_string()));
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn set_aside(&self, key: &str) -> Result<Option<String>> {
        let mut values = self.values.borrow_mut();
        let Some(value) = values.remove(key) else {
            return Ok(None);
        };
        let mut target = format!("{}.corrupt", key);
        let mut n = 1;
        while values.contains_key(&target) {
            n += 1;
            target = format!("{}.corrupt-{}", key, n);
        }
        values.insert(target.clone(), value);
        Ok(Some(target))
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use crate::config::PostbookConfig;
    use crate::model::Draft;
    use crate::repository::PostRepository;

    use super::InMemoryStore;

    /// Builds a repository over an in-memory store, seeded with posts.
    pub struct RepoFixture {
        pub repo: PostRepository<InMemoryStore>,
    }

    impl Default for RepoFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RepoFixture {
        pub fn new() -> Self {
            let repo = PostRepository::open(InMemoryStore::new(), &PostbookConfig::default())
                .value;
            Self { repo }
        }

        /// Adds `count` posts titled "Post 1".."Post N"; the last one is newest.
        pub fn with_posts(mut self, count: usize) -> Self {
            for i in 0..count {
                let draft = Draft::new(
                    format!("Post {}", i + 1),
                    format!("Content for post {}", i + 1),
                );
                self.repo.save(draft).unwrap();
            }
            self
        }

        pub fn with_tagged_post(mut self, title: &str, tags: &[&str]) -> Self {
            let draft = Draft::new(title, format!("About {}", title)).with_tags(tags.iter().copied());
            self.repo.save(draft).unwrap();
            self
        }
    }
}
