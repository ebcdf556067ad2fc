//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO I/O (serde for the stored shapes only).

mod entity;
mod item;
mod history;
mod ledger_entry;
mod view_mode;

pub use entity::{Entity, DomainError, DomainResult};
pub use item::{Item, ItemDraft, ItemLink, DEFAULT_LINK_LABEL};
pub use history::{HistoryAction, HistoryEntry};
pub use ledger_entry::{EntryDraft, LedgerEntry, UNCATEGORIZED, UNKNOWN_PAYER};
pub use view_mode::{DisplayMode, ItemQuery, SortMode};
