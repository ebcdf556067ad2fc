//! Stock / Warikan Frontend Entry Point

mod commands;
mod context;
mod store;
mod components;
mod app;

use app::App;
use leptos::prelude::*;
use tracing::Level;

/// Lines kept in memory for the in-page log dump
const LOG_CAPACITY: usize = 200;

fn main() {
    console_error_panic_hook::set_once();

    let sink: rolling_logger::Sink = Box::new(|level, line| {
        let line = wasm_bindgen::JsValue::from_str(line);
        match level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    });
    if let Err(e) = rolling_logger::init_logger(LOG_CAPACITY, Level::INFO, sink) {
        web_sys::console::warn_1(&e.to_string().into());
    }

    mount_to_body(App);
}
