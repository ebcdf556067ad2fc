//! In-memory Document Store
//!
//! Behaves like the remote database closely enough for tests and native
//! runs: live queries fire immediately and after every write, writes to
//! chosen paths can be made to fail.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{DomainError, DomainResult};
use super::traits::{DocCallback, Document, DocumentStore, OrderBy, SnapshotCallback, Subscription};

struct CollectionWatch {
    id: u64,
    collection: String,
    order: Option<OrderBy>,
    callback: Rc<dyn Fn(Vec<Document>)>,
}

struct DocWatch {
    id: u64,
    path: String,
    callback: Rc<dyn Fn(Option<Value>)>,
}

#[derive(Default)]
struct Inner {
    docs: BTreeMap<String, Value>,
    collection_watches: Vec<CollectionWatch>,
    doc_watches: Vec<DocWatch>,
    next_watch_id: u64,
    next_doc_id: u64,
    failing: HashSet<String>,
    writes: Vec<String>,
}

/// Cloneable handle; clones share the same data
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later write to `path` fail
    pub fn fail_writes_to(&self, path: impl Into<String>) {
        self.inner.borrow_mut().failing.insert(path.into());
    }

    /// Paths written so far, in order (sets, adds and deletes)
    pub fn writes(&self) -> Vec<String> {
        self.inner.borrow().writes.clone()
    }

    pub fn doc(&self, path: &str) -> Option<Value> {
        self.inner.borrow().docs.get(path).cloned()
    }

    /// Documents directly inside `collection`, ordered by id
    pub fn collection(&self, collection: &str) -> Vec<Document> {
        collect(&self.inner.borrow().docs, collection, None)
    }

    pub fn active_watches(&self) -> usize {
        let inner = self.inner.borrow();
        inner.collection_watches.len() + inner.doc_watches.len()
    }

    fn check_writable(&self, path: &str) -> DomainResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.writes.push(path.to_string());
        if inner.failing.contains(path) {
            return Err(DomainError::storage(format!("permission-denied: {}", path)));
        }
        Ok(())
    }

    /// Fire watchers affected by a change to `path`.
    /// Callbacks run without the borrow held so they may read the store.
    fn notify(&self, path: &str) {
        let parent = parent_collection(path);
        let (collection_hits, doc_hits) = {
            let inner = self.inner.borrow();
            let collection_hits: Vec<_> = inner
                .collection_watches
                .iter()
                .filter(|w| Some(w.collection.as_str()) == parent)
                .map(|w| (w.callback.clone(), collect(&inner.docs, &w.collection, w.order.as_ref())))
                .collect();
            let doc_hits: Vec<_> = inner
                .doc_watches
                .iter()
                .filter(|w| w.path == path)
                .map(|w| (w.callback.clone(), inner.docs.get(path).cloned()))
                .collect();
            (collection_hits, doc_hits)
        };
        for (callback, docs) in collection_hits {
            callback(docs);
        }
        for (callback, data) in doc_hits {
            callback(data);
        }
    }
}

fn parent_collection(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}

fn collect(docs: &BTreeMap<String, Value>, collection: &str, order: Option<&OrderBy>) -> Vec<Document> {
    let prefix = format!("{}/", collection);
    let mut out: Vec<Document> = docs
        .range(prefix.clone()..)
        .take_while(|(path, _)| path.starts_with(&prefix))
        .filter(|(path, _)| !path[prefix.len()..].contains('/'))
        .map(|(path, data)| Document {
            id: path[prefix.len()..].to_string(),
            data: data.clone(),
        })
        .collect();

    if let Some(order) = order {
        let key = |d: &Document| d.data.get(&order.field).and_then(Value::as_f64).unwrap_or(0.0);
        out.sort_by(|a, b| key(a).total_cmp(&key(b)));
        if order.descending {
            out.reverse();
        }
    }
    out
}

#[async_trait(?Send)]
impl DocumentStore for MemoryDocumentStore {
    async fn get_doc(&self, path: &str) -> DomainResult<Option<Value>> {
        Ok(self.doc(path))
    }

    async fn set_doc(&self, path: &str, data: Value, merge: bool) -> DomainResult<()> {
        self.check_writable(path)?;
        {
            let mut inner = self.inner.borrow_mut();
            let replacement = match (merge, inner.docs.get_mut(path)) {
                (true, Some(Value::Object(existing))) => match data {
                    Value::Object(fields) => {
                        existing.extend(fields);
                        None
                    }
                    other => Some(other),
                },
                _ => Some(data),
            };
            if let Some(data) = replacement {
                inner.docs.insert(path.to_string(), data);
            }
        }
        self.notify(path);
        Ok(())
    }

    async fn add_doc(&self, collection: &str, data: Value) -> DomainResult<String> {
        self.check_writable(collection)?;
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.next_doc_id += 1;
            let id = format!("auto{:06}", inner.next_doc_id);
            inner.docs.insert(format!("{}/{}", collection, id), data);
            id
        };
        self.notify(&format!("{}/{}", collection, id));
        Ok(id)
    }

    async fn delete_doc(&self, path: &str) -> DomainResult<()> {
        self.check_writable(path)?;
        let removed = self.inner.borrow_mut().docs.remove(path).is_some();
        if removed {
            self.notify(path);
        }
        Ok(())
    }

    fn watch_collection(
        &self,
        collection: &str,
        order: Option<OrderBy>,
        on_snapshot: SnapshotCallback,
    ) -> Subscription {
        let callback: Rc<dyn Fn(Vec<Document>)> = Rc::from(on_snapshot);
        let (id, initial) = {
            let mut inner = self.inner.borrow_mut();
            inner.next_watch_id += 1;
            let id = inner.next_watch_id;
            let initial = collect(&inner.docs, collection, order.as_ref());
            inner.collection_watches.push(CollectionWatch {
                id,
                collection: collection.to_string(),
                order,
                callback: callback.clone(),
            });
            (id, initial)
        };
        callback(initial);

        let inner = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.borrow_mut().collection_watches.retain(|w| w.id != id);
            }
        })
    }

    fn watch_doc(&self, path: &str, on_snapshot: DocCallback) -> Subscription {
        let callback: Rc<dyn Fn(Option<Value>)> = Rc::from(on_snapshot);
        let (id, initial) = {
            let mut inner = self.inner.borrow_mut();
            inner.next_watch_id += 1;
            let id = inner.next_watch_id;
            inner.doc_watches.push(DocWatch {
                id,
                path: path.to_string(),
                callback: callback.clone(),
            });
            (id, inner.docs.get(path).cloned())
        };
        callback(initial);

        let inner = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.borrow_mut().doc_watches.retain(|w| w.id != id);
            }
        })
    }
}
