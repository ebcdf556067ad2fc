//! Ledger Entry
//!
//! One expense in a Warikan project: who paid how much, when, and for what.

use serde::{Deserialize, Serialize};

/// Payer label used in totals when an entry has no payer
pub const UNKNOWN_PAYER: &str = "不明";

/// Category label used in category totals when an entry has none
pub const UNCATEGORIZED: &str = "未分類";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    /// Free-text memo
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub payer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl LedgerEntry {
    pub fn new(date: impl Into<String>, payer: impl Into<String>, amount: u64) -> Self {
        Self {
            date: date.into(),
            text: String::new(),
            amount,
            payer: payer.into(),
            category: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Raw form input for a ledger entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub date: String,
    pub text: String,
    /// Amount as typed; blank means missing
    pub amount: String,
    pub payer: String,
    pub category: Option<String>,
}

impl From<&LedgerEntry> for EntryDraft {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            date: entry.date.clone(),
            text: entry.text.clone(),
            amount: entry.amount.to_string(),
            payer: entry.payer.clone(),
            category: entry.category.clone(),
        }
    }
}

impl EntryDraft {
    /// Reset after a successful add: date and category stay for the next entry
    pub fn clear_for_next(&mut self) {
        self.text.clear();
        self.amount.clear();
        self.payer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_without_category_deserialize() {
        let json = r#"[{"date":"2024-05-01","text":"lunch","amount":1200,"payer":"A"}]"#;
        let entries: Vec<LedgerEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].category, None);
        assert_eq!(entries[0].amount, 1200);
    }

    #[test]
    fn test_draft_from_entry() {
        let entry = LedgerEntry::new("2024-05-01", "A", 300).with_text("taxi");
        let draft = EntryDraft::from(&entry);
        assert_eq!(draft.amount, "300");
        assert_eq!(draft.text, "taxi");
    }

    #[test]
    fn test_clear_keeps_date_and_category() {
        let mut draft = EntryDraft {
            date: "2024-05-01".into(),
            text: "taxi".into(),
            amount: "300".into(),
            payer: "A".into(),
            category: Some("交通費".into()),
        };
        draft.clear_for_next();
        assert_eq!(draft.date, "2024-05-01");
        assert_eq!(draft.category.as_deref(), Some("交通費"));
        assert!(draft.text.is_empty() && draft.amount.is_empty() && draft.payer.is_empty());
    }
}
