//! UI Components
//!
//! Leptos components for both apps.

mod delete_confirm_button;

// Stock
mod auth_view;
mod category_admin;
mod history_table;
mod item_board;
mod item_modal;
mod stock_app;

// Warikan
mod category_chart;
mod entry_form;
mod entry_table;
mod ledger_categories;
mod project_bar;
mod settlement_panel;
mod warikan_app;

pub use delete_confirm_button::DeleteConfirmButton;

pub use auth_view::AuthView;
pub use category_admin::CategoryAdmin;
pub use history_table::HistoryTable;
pub use item_board::ItemBoard;
pub use item_modal::ItemModalHost;
pub use stock_app::StockApp;

pub use category_chart::CategoryChart;
pub use entry_form::EntryForm;
pub use entry_table::EntryTable;
pub use ledger_categories::LedgerCategories;
pub use project_bar::ProjectBar;
pub use settlement_panel::SettlementPanel;
pub use warikan_app::WarikanApp;
