//! Core of the Stock inventory tracker and the Warikan expense ledger.
//!
//! Everything here is UI-agnostic: the browser front-end plugs its own
//! [`repository::DocumentStore`] and [`repository::KeyValueStorage`] in.

pub mod clock;
pub mod config;
pub mod domain;
pub mod repository;
pub mod services;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use domain::{DomainError, DomainResult};
