//! Browser Key-Value Storage
//!
//! `window.localStorage` behind the [`KeyValueStorage`] seam.

use ledger_core::domain::{DomainError, DomainResult};
use ledger_core::repository::KeyValueStorage;
use wasm_bindgen::JsValue;

pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    /// `None` when storage is unavailable (private mode, sandboxed frame)
    pub fn local() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

fn storage_error(e: JsValue) -> DomainError {
    DomainError::storage(
        js_sys::Reflect::get(&e, &JsValue::from_str("name"))
            .ok()
            .and_then(|n| n.as_string())
            .unwrap_or_else(|| format!("{:?}", e)),
    )
}

impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        self.storage.set_item(key, value).map_err(storage_error)
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        self.storage.remove_item(key).map_err(storage_error)
    }
}
