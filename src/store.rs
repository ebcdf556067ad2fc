//! Stock View State
//!
//! UI-only state of the Stock app, held in a reactive store for
//! field-level reactivity.

use leptos::prelude::*;
use ledger_core::domain::{DisplayMode, ItemDraft, ItemQuery, SortMode};
use reactive_stores::Store;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Home,
    History,
    Settings,
}

#[derive(Clone, Debug, Default, Store)]
pub struct StockView {
    pub tab: Tab,
    pub search: String,
    pub sort: SortMode,
    pub display: DisplayMode,
    /// Draft shown in the item modal; `None` when closed
    pub editing: Option<ItemDraft>,
}

pub type StockStore = Store<StockView>;

pub fn use_stock_store() -> StockStore {
    expect_context::<StockStore>()
}

/// The list query for the current controls
pub fn current_query(store: &StockStore) -> ItemQuery {
    ItemQuery {
        search: store.search().get(),
        sort: store.sort().get(),
        display: store.display().get(),
    }
}

/// Same as [`current_query`] without subscribing; `None` once the store is gone
pub fn current_query_untracked(store: &StockStore) -> Option<ItemQuery> {
    Some(ItemQuery {
        search: store.search().try_get_untracked()?,
        sort: store.sort().try_get_untracked()?,
        display: store.display().try_get_untracked()?,
    })
}
