//! Application Configuration
//!
//! Defaults for both apps; any field can be overridden from JSON.

use serde::{Deserialize, Serialize};

use crate::domain::DomainResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Category set written to a new user's profile
    pub default_categories: Vec<String>,
    /// Warikan category set used until the user edits it
    pub default_ledger_categories: Vec<String>,
    /// Project selected when no other exists
    pub default_project: String,
    /// Number of history rows shown
    pub history_limit: usize,
    /// Uploaded images are scaled down to this width
    pub image_max_width: u32,
    pub placeholder_image: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_categories: vec!["文房具".into(), "日用品".into(), "食品".into()],
            default_ledger_categories: vec!["食費".into(), "交通費".into(), "宿泊費".into(), "その他".into()],
            default_project: "default".into(),
            history_limit: 100,
            image_max_width: 400,
            placeholder_image: "https://via.placeholder.com/200x200?text=No+Image".into(),
        }
    }
}

impl AppConfig {
    /// Parse overrides; missing fields keep their defaults
    pub fn from_json(raw: &str) -> DomainResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
