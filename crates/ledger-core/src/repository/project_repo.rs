//! Project Repository
//!
//! Warikan's storage layout:
//! `projectList` (names), `<projectName>` (entries), `categories`, `lastProject`.

use std::rc::Rc;

use crate::domain::{DomainResult, LedgerEntry};
use super::traits::{KeyValueStorage, KeyValueStorageExt};

pub const PROJECT_LIST_KEY: &str = "projectList";
pub const CATEGORIES_KEY: &str = "categories";
pub const LAST_PROJECT_KEY: &str = "lastProject";

pub struct ProjectRepository<K: KeyValueStorage> {
    storage: Rc<K>,
}

impl<K: KeyValueStorage> Clone for ProjectRepository<K> {
    fn clone(&self) -> Self {
        Self { storage: self.storage.clone() }
    }
}

impl<K: KeyValueStorage> ProjectRepository<K> {
    pub fn new(storage: Rc<K>) -> Self {
        Self { storage }
    }

    pub fn project_names(&self) -> Vec<String> {
        self.storage.read_json_or_default(PROJECT_LIST_KEY)
    }

    pub fn save_project_names(&self, names: &[String]) -> DomainResult<()> {
        self.storage.write_json(PROJECT_LIST_KEY, names)
    }

    /// Entries of a project; absent or corrupt data reads as empty
    pub fn load_entries(&self, project: &str) -> Vec<LedgerEntry> {
        self.storage.read_json_or_default(project)
    }

    /// Overwrite the whole entry list of a project
    pub fn save_entries(&self, project: &str, entries: &[LedgerEntry]) -> DomainResult<()> {
        self.storage.write_json(project, entries)
    }

    pub fn has_entries_key(&self, project: &str) -> bool {
        self.storage.get(project).is_some()
    }

    pub fn remove_entries(&self, project: &str) -> DomainResult<()> {
        self.storage.remove(project)
    }

    pub fn last_project(&self) -> Option<String> {
        self.storage.get(LAST_PROJECT_KEY).filter(|s| !s.is_empty())
    }

    pub fn set_last_project(&self, project: &str) -> DomainResult<()> {
        self.storage.set(LAST_PROJECT_KEY, project)
    }

    /// `None` when the key was never written
    pub fn categories(&self) -> Option<Vec<String>> {
        self.storage.get(CATEGORIES_KEY)?;
        Some(self.storage.read_json_or_default(CATEGORIES_KEY))
    }

    pub fn save_categories(&self, categories: &[String]) -> DomainResult<()> {
        self.storage.write_json(CATEGORIES_KEY, categories)
    }
}
