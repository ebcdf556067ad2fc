//! Application Context
//!
//! Per-app handles provided via the Leptos Context API. Services live in
//! local (non-`Send`) stored values; version counters stand in for their
//! interior changes so views can subscribe.

use leptos::prelude::*;
use ledger_core::domain::{DomainResult, EntryDraft};
use ledger_core::services::{InventoryService, LedgerService, Slice};

use crate::commands::{alert, BrowserStorage, FirestoreBridge};

pub type Inventory = InventoryService<FirestoreBridge>;
pub type Ledger = LedgerService<BrowserStorage>;

/// Signed-in Stock session
#[derive(Clone, Copy)]
pub struct StockContext {
    service: StoredValue<Inventory, LocalStorage>,
    items_version: RwSignal<u32>,
    history_version: RwSignal<u32>,
    categories_version: RwSignal<u32>,
}

impl StockContext {
    pub fn new(service: Inventory) -> Self {
        Self {
            service: StoredValue::new_local(service),
            items_version: RwSignal::new(0),
            history_version: RwSignal::new(0),
            categories_version: RwSignal::new(0),
        }
    }

    /// A handle to the service, for async work
    pub fn service(&self) -> Inventory {
        self.service.get_value()
    }

    /// Mark a slice as replaced; safe to call after the view is gone
    pub fn bump(&self, slice: Slice) {
        let version = match slice {
            Slice::Items => self.items_version,
            Slice::History => self.history_version,
            Slice::Categories => self.categories_version,
        };
        version.try_update(|v| *v += 1);
    }

    /// Read the service while subscribing to the given slices
    pub fn with<T>(&self, slices: &[Slice], f: impl FnOnce(&Inventory) -> T) -> T {
        for slice in slices {
            match slice {
                Slice::Items => self.items_version.track(),
                Slice::History => self.history_version.track(),
                Slice::Categories => self.categories_version.track(),
            }
        }
        self.service.with_value(f)
    }
}

pub fn use_stock() -> StockContext {
    expect_context::<StockContext>()
}

/// Warikan ledger over `localStorage`
#[derive(Clone, Copy)]
pub struct WarikanContext {
    ledger: StoredValue<Ledger, LocalStorage>,
    version: RwSignal<u32>,
    /// Entry form contents, refilled by "edit"
    pub draft: RwSignal<EntryDraft>,
}

impl WarikanContext {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: StoredValue::new_local(ledger),
            version: RwSignal::new(0),
            draft: RwSignal::new(EntryDraft::default()),
        }
    }

    /// Reactive read
    pub fn with<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        self.version.track();
        self.ledger.with_value(f)
    }

    /// Run a mutation, alerting on failure. Returns the value on success.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut Ledger) -> DomainResult<T>) -> Option<T> {
        let result = self.ledger.try_update_value(f)?;
        self.version.update(|v| *v += 1);
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "ledger update rejected");
                alert(&e.to_string());
                None
            }
        }
    }
}

pub fn use_warikan() -> WarikanContext {
    expect_context::<WarikanContext>()
}
