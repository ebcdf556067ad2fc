//! Runtime Configuration
//!
//! Optional overrides placed by the host page at `window.__APP_CONFIG__`.

use ledger_core::AppConfig;
use wasm_bindgen::JsValue;

pub fn load_config() -> AppConfig {
    let Some(window) = web_sys::window() else {
        return AppConfig::default();
    };
    let raw = js_sys::Reflect::get(&window, &JsValue::from_str("__APP_CONFIG__")).unwrap_or(JsValue::UNDEFINED);
    if raw.is_undefined() || raw.is_null() {
        return AppConfig::default();
    }
    serde_wasm_bindgen::from_value(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable __APP_CONFIG__");
        AppConfig::default()
    })
}

/// Which app the host page asked for via `<body data-app="...">`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKind {
    Stock,
    Warikan,
}

pub fn app_kind() -> AppKind {
    let requested = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
        .and_then(|b| b.dataset().get("app"));
    match requested.as_deref() {
        Some("warikan") => AppKind::Warikan,
        _ => AppKind::Stock,
    }
}
