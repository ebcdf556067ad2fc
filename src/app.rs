//! App Root
//!
//! Picks the Stock or Warikan app from the page's `data-app` attribute.

use leptos::prelude::*;

use crate::commands::{app_kind, load_config, AppKind};
use crate::components::{StockApp, WarikanApp};

#[component]
pub fn App() -> impl IntoView {
    let config = load_config();
    let kind = app_kind();
    tracing::info!(app = ?kind, "starting");

    match kind {
        AppKind::Stock => view! { <StockApp config=config /> }.into_any(),
        AppKind::Warikan => view! { <WarikanApp config=config /> }.into_any(),
    }
}
