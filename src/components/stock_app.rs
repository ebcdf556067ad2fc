//! Stock App
//!
//! Auth gate, then the signed-in shell: header, tabs, and a live sync
//! session that lives exactly as long as the shell.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use ledger_core::services::{ChangeListener, InventoryService, SyncSession};
use ledger_core::{AppConfig, SystemClock};
use reactive_stores::Store;

use crate::commands::{self, alert, confirm, AuthUser, FirestoreBridge};
use crate::components::{AuthView, CategoryAdmin, HistoryTable, ItemBoard, ItemModalHost};
use crate::context::StockContext;
use crate::store::{StockView, StockViewStoreFields, Tab};

#[component]
pub fn StockApp(config: AppConfig) -> impl IntoView {
    let user = RwSignal::new(None::<AuthUser>);
    let auth_ready = RwSignal::new(false);
    let uid = Memo::new(move |_| user.with(|u| u.as_ref().map(|u| u.uid.clone())));

    // Dropped with the app, which unregisters the listener
    let _auth = StoredValue::new_local(commands::on_auth_changed(move |next| {
        match &next {
            Some(u) => tracing::info!(uid = %u.uid, "user logged in"),
            None => tracing::info!("user logged out"),
        }
        user.try_set(next);
        auth_ready.try_set(true);
    }));
    let config = StoredValue::new(config);

    view! {
        <Show
            when=move || auth_ready.get()
            fallback=|| view! { <div class="loading">"読み込み中..."</div> }
        >
            {move || match (uid.get(), user.get_untracked()) {
                (Some(_), Some(u)) => view! { <StockShell user=u config=config.get_value() /> }.into_any(),
                _ => view! { <AuthView /> }.into_any(),
            }}
        </Show>
    }
}

#[component]
fn StockShell(user: AuthUser, config: AppConfig) -> impl IntoView {
    let service = InventoryService::new(
        Rc::new(FirestoreBridge),
        user.uid.clone(),
        Rc::new(SystemClock),
        Rc::new(config),
    );
    let ctx = StockContext::new(service.clone());
    provide_context(ctx);
    let store = Store::new(StockView::default());
    provide_context(store);

    let session = StoredValue::new_local(None::<SyncSession>);
    spawn_local(async move {
        let on_change: ChangeListener = Rc::new(move |slice| ctx.bump(slice));
        match SyncSession::start(&service, on_change).await {
            Ok(started) => {
                // A shell torn down meanwhile drops the session right here
                let _ = session.try_update_value(move |slot| *slot = Some(started));
            }
            Err(e) => {
                tracing::warn!(error = %e, "sync failed to start");
                alert(&e.to_string());
            }
        }
    });
    on_cleanup(move || {
        if let Some(Some(running)) = session.try_update_value(Option::take) {
            running.stop();
        }
    });

    let on_logout = move |_: web_sys::MouseEvent| {
        if confirm("ログアウトしますか？") {
            spawn_local(async move {
                if let Err(e) = commands::sign_out().await {
                    alert(&e);
                }
            });
        }
    };

    let tab_button = move |tab: Tab, label: &'static str| {
        view! {
            <button
                type="button"
                class=move || if store.tab().get() == tab { "nav-item active" } else { "nav-item" }
                on:click=move |_| {
                    store.tab().set(tab);
                    if let Some(w) = web_sys::window() {
                        w.scroll_to_with_x_and_y(0.0, 0.0);
                    }
                }
            >
                {label}
            </button>
        }
    };

    let label = user.label();
    let email = user.email.clone().unwrap_or_default();

    view! {
        <div class="app">
            <header class="app-header">
                <h1>"Stock"</h1>
                <div class="user-profile">
                    {user.photo_url.clone().map(|src| view! { <img class="user-photo" src=src alt="" /> })}
                    <div class="user-text">
                        <span class="user-name">{label}</span>
                        <span class="user-email">{email}</span>
                    </div>
                    <button type="button" class="logout-btn" on:click=on_logout>"ログアウト"</button>
                </div>
            </header>

            <main class="tab-content">
                {move || match store.tab().get() {
                    Tab::Home => view! { <ItemBoard /> }.into_any(),
                    Tab::History => view! { <HistoryTable /> }.into_any(),
                    Tab::Settings => view! { <CategoryAdmin /> }.into_any(),
                }}
            </main>

            <nav class="bottom-nav">
                {tab_button(Tab::Home, "ホーム")}
                {tab_button(Tab::History, "履歴")}
                {tab_button(Tab::Settings, "設定")}
            </nav>

            <ItemModalHost />
        </div>
    }
}
