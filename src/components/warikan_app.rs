//! Warikan App
//!
//! Expense splitting ledger kept in `localStorage`.

use std::rc::Rc;

use leptos::prelude::*;
use ledger_core::services::LedgerService;
use ledger_core::{AppConfig, SystemClock};

use crate::commands::BrowserStorage;
use crate::components::{CategoryChart, EntryForm, EntryTable, LedgerCategories, ProjectBar, SettlementPanel};
use crate::context::{use_warikan, WarikanContext};

#[component]
pub fn WarikanApp(config: AppConfig) -> impl IntoView {
    let Some(storage) = BrowserStorage::local() else {
        tracing::warn!("localStorage unavailable");
        return view! { <p class="error">"このブラウザではローカルストレージを利用できません。"</p> }.into_any();
    };
    let ledger = LedgerService::open(Rc::new(storage), Rc::new(SystemClock), Rc::new(config));
    provide_context(WarikanContext::new(ledger));

    view! { <WarikanShell /> }.into_any()
}

#[component]
fn WarikanShell() -> impl IntoView {
    let ctx = use_warikan();

    view! {
        <div class="warikan">
            <header>
                <h1>"割り勘メモ"</h1>
                <p class="current-project">{move || format!("現在の案件：{}", ctx.with(|l| l.current_project().to_string()))}</p>
            </header>
            <ProjectBar />
            <EntryForm />
            <EntryTable />
            <SettlementPanel />
            <CategoryChart />
            <LedgerCategories />
        </div>
    }
}
