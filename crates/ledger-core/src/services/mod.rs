//! Service Layer
//!
//! Business logic for both apps on top of the repository seams.

mod settlement;
mod csv_export;
mod inventory;
mod ledger;
mod sync;

pub use settlement::{category_totals, format_yen, payer_totals, settle, Outcome, PayerTotals, Settlement, SettlementLine};
pub use csv_export::{export_csv, export_filename, CsvExport, CSV_MIME_TYPE, UTF8_BOM};
pub use inventory::{
    next_item_id, reorder_hint, reorder_items, scaled_dimensions, InventoryService,
    InventoryState,
};
pub use ledger::LedgerService;
pub use sync::{ChangeListener, Slice, SyncSession};
