//! In-memory Key-Value Storage

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::domain::{DomainError, DomainResult};
use super::traits::KeyValueStorage;

/// Cloneable handle; clones share the same map
#[derive(Clone, Default)]
pub struct MemoryStorage {
    values: Rc<RefCell<BTreeMap<String, String>>>,
    read_only: Rc<Cell<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes, like a browser whose storage quota is exhausted
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn keys(&self) -> Vec<String> {
        self.values.borrow().keys().cloned().collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        if self.read_only.get() {
            return Err(DomainError::storage("QuotaExceededError"));
        }
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        if self.read_only.get() {
            return Err(DomainError::storage("QuotaExceededError"));
        }
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}
