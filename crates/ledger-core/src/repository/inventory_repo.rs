//! Inventory Repository
//!
//! Writes for one signed-in user's documents. Reads happen through the
//! live queries set up by the sync session.

use std::rc::Rc;

use serde_json::{json, Value};

use crate::domain::{DomainResult, HistoryEntry, Item};
use super::paths;
use super::traits::DocumentStore;

pub struct InventoryRepository<D: DocumentStore> {
    store: Rc<D>,
    uid: String,
}

impl<D: DocumentStore> Clone for InventoryRepository<D> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), uid: self.uid.clone() }
    }
}

impl<D: DocumentStore> InventoryRepository<D> {
    pub fn new(store: Rc<D>, uid: impl Into<String>) -> Self {
        Self { store, uid: uid.into() }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn store(&self) -> &Rc<D> {
        &self.store
    }

    /// Full-document write of an item
    pub async fn save_item(&self, item: &Item) -> DomainResult<()> {
        let data = serde_json::to_value(item)?;
        self.store.set_doc(&paths::item_doc(&self.uid, &item.id), data, false).await
    }

    pub async fn delete_item(&self, id: &str) -> DomainResult<()> {
        self.store.delete_doc(&paths::item_doc(&self.uid, id)).await
    }

    /// Append a history record under a generated id
    pub async fn append_history(&self, entry: &HistoryEntry) -> DomainResult<String> {
        let data = serde_json::to_value(entry)?;
        self.store.add_doc(&paths::history_collection(&self.uid), data).await
    }

    /// Merge-write the category set into the profile document
    pub async fn save_categories(&self, categories: &[String]) -> DomainResult<()> {
        self.store
            .set_doc(&paths::user_doc(&self.uid), json!({ "categories": categories }), true)
            .await
    }

    pub async fn load_profile(&self) -> DomainResult<Option<Value>> {
        self.store.get_doc(&paths::user_doc(&self.uid)).await
    }
}
