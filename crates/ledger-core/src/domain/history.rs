//! History Entry
//!
//! Append-only record of a count change, stored as `users/{uid}/history/{auto}`.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// What happened to the item
///
/// Serialized with the labels already present in stored history documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryAction {
    #[serde(rename = "新規登録")]
    Create,
    #[serde(rename = "追加")]
    Increment,
    #[serde(rename = "削減")]
    Decrement,
    #[serde(rename = "情報更新")]
    Update,
}

impl HistoryAction {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryAction::Create => "新規登録",
            HistoryAction::Increment => "追加",
            HistoryAction::Decrement => "削減",
            HistoryAction::Update => "情報更新",
        }
    }

    /// CSS class for the action badge
    pub fn badge_class(&self) -> &'static str {
        match self {
            HistoryAction::Increment => "action-add",
            HistoryAction::Decrement => "action-reduce",
            HistoryAction::Create | HistoryAction::Update => "action-create",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Local time for display, `%Y/%m/%d %H:%M:%S`
    pub date: String,
    pub item_name: String,
    pub action: HistoryAction,
    pub from: u32,
    pub to: u32,
    /// Milliseconds since epoch; the sync query orders by this field
    #[serde(default)]
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn record(
        at: DateTime<Local>,
        item_name: impl Into<String>,
        action: HistoryAction,
        from: u32,
        to: u32,
    ) -> Self {
        Self {
            date: at.format("%Y/%m/%d %H:%M:%S").to_string(),
            item_name: item_name.into(),
            action,
            from,
            to,
            timestamp: at.timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_action_round_trips_stored_labels() {
        let entry: HistoryEntry = serde_json::from_value(serde_json::json!({
            "date": "2024/1/5 10:00:00",
            "itemName": "Pen",
            "action": "削減",
            "from": 2,
            "to": 1,
            "timestamp": 1704416400000i64
        }))
        .unwrap();
        assert_eq!(entry.action, HistoryAction::Decrement);
        assert_eq!(entry.action.badge_class(), "action-reduce");
    }

    #[test]
    fn test_record_formats_date() {
        let at = Local.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        let entry = HistoryEntry::record(at, "Pen", HistoryAction::Create, 0, 4);
        assert_eq!(entry.date, "2024/02/03 04:05:06");
        assert_eq!(entry.timestamp, at.timestamp_millis());
    }
}
