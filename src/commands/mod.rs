//! Browser Bridges
//!
//! Everything that talks to the host page: the cloud store shim, local
//! storage, file download and image handling.

mod config;
mod dialog;
mod download;
mod firestore;
mod image;
mod storage;

pub use config::{app_kind, load_config, AppKind};
pub use dialog::{alert, confirm};
pub use download::download_bytes;
pub use firestore::{
    on_auth_changed, sign_in_with_email, sign_in_with_google, sign_out, sign_up_with_email, AuthUser,
    FirestoreBridge,
};
pub use image::compress_image;
pub use storage::BrowserStorage;
