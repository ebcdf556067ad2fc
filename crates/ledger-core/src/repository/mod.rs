//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod memory_store;
mod memory_storage;
mod inventory_repo;
mod project_repo;
pub mod paths;

#[cfg(test)]
mod tests;

pub use traits::{
    DocCallback, Document, DocumentStore, KeyValueStorage, KeyValueStorageExt, OrderBy,
    SnapshotCallback, Subscription,
};
pub use memory_store::MemoryDocumentStore;
pub use memory_storage::MemoryStorage;
pub use inventory_repo::InventoryRepository;
pub use project_repo::{ProjectRepository, CATEGORIES_KEY, LAST_PROJECT_KEY, PROJECT_LIST_KEY};
