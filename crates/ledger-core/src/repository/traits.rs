//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for the two external stores:
//! a remote document database with live queries, and a synchronous
//! key-value storage. Implementations: in-memory (tests, native) and
//! browser bridges (UI crate).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::DomainResult;

/// A document as delivered by a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Server-side ordering for a collection query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), descending: true }
    }
}

/// Receives the full contents of a collection on every change
pub type SnapshotCallback = Box<dyn Fn(Vec<Document>)>;

/// Receives a document's data, `None` when it does not exist
pub type DocCallback = Box<dyn Fn(Option<Value>)>;

/// Handle to a live query; dropping it (or calling `cancel`) unsubscribes
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// A subscription with nothing to tear down
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Remote document database (slash-separated paths, full-document writes)
///
/// Futures are `!Send`: the browser is single-threaded.
#[async_trait(?Send)]
pub trait DocumentStore {
    /// Read a document once
    async fn get_doc(&self, path: &str) -> DomainResult<Option<Value>>;

    /// Write a whole document; with `merge` only the given top-level fields change
    async fn set_doc(&self, path: &str, data: Value, merge: bool) -> DomainResult<()>;

    /// Write a new document with a store-generated id, returning the id
    async fn add_doc(&self, collection: &str, data: Value) -> DomainResult<String>;

    async fn delete_doc(&self, path: &str) -> DomainResult<()>;

    /// Subscribe to a collection; the callback fires with the current contents
    /// right away and again after every change
    fn watch_collection(
        &self,
        collection: &str,
        order: Option<OrderBy>,
        on_snapshot: SnapshotCallback,
    ) -> Subscription;

    /// Subscribe to a single document
    fn watch_doc(&self, path: &str, on_snapshot: DocCallback) -> Subscription;
}

/// Synchronous string key-value storage (browser `localStorage`)
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> DomainResult<()>;

    fn remove(&self, key: &str) -> DomainResult<()>;
}

/// JSON helpers over any key-value storage
pub trait KeyValueStorageExt: KeyValueStorage {
    /// Parse a JSON value, falling back to the default when the key is
    /// absent or unreadable
    fn read_json_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.get(key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "unreadable storage value, using default");
                T::default()
            }),
            None => T::default(),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> DomainResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorageExt for S {}
