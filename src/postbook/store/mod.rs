//! # Storage Layer
//!
//! The [`PersistentStore`] trait is the only persistence capability the rest
//! of postbook consumes: a durable map from a string key to a JSON value.
//!
//! ## Whole-Snapshot Writes
//!
//! The repository keeps the entire post collection under one key and rewrites
//! it on every mutation. There is no per-record update and no version check,
//! so two processes writing the same data directory will lose each other's
//! changes. Postbook is single-user; supporting several writers would need
//! per-record keys or compare-and-swap writes at this layer.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: one `<key>.json` file per key, written atomically.
//! - [`memory::InMemoryStore`]: `RefCell` map for tests, with write-failure
//!   simulation.
//!
//! ## Storage Layout
//!
//! ```text
//! $POSTBOOK_HOME/
//! ├── posts.json     # JSON array of post records
//! ├── posts.json.corrupt-<UTC timestamp>  # unreadable snapshots, set aside
//! └── config.json    # PostbookConfig
//! ```

use crate::error::Result;
use serde_json::Value;

pub mod fs;
pub mod memory;

/// Durable key/value storage for JSON documents.
///
/// Methods take `&self`: postbook is single-threaded, and implementations
/// that need mutation use interior mutability.
pub trait PersistentStore {
    /// Read the value stored under `key`, or `None` if nothing was written yet.
    fn read(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: &Value) -> Result<()>;

    /// Move whatever is stored under `key` out of the way without reading it,
    /// so the next `write` cannot destroy it. Returns where the old bytes now
    /// live, or `None` if nothing was stored.
    fn set_aside(&self, key: &str) -> Result<Option<String>>;
}

impl<S: PersistentStore + ?Sized> PersistentStore for &S {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &Value) -> Result<()> {
        (**self).write(key, value)
    }

    fn set_aside(&self, key: &str) -> Result<Option<String>> {
        (**self).set_aside(key)
    }
}
