//! Item list presentation modes

use serde::{Deserialize, Serialize};

/// How the item list is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// User-defined `order`, editable by drag and drop
    #[default]
    Custom,
    Name,
    /// Highest count first
    Count,
    /// Most recently updated first
    Updated,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [SortMode::Custom, SortMode::Name, SortMode::Count, SortMode::Updated];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Custom => "custom",
            SortMode::Name => "name",
            SortMode::Count => "count",
            SortMode::Updated => "updated",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "name" => SortMode::Name,
            "count" => SortMode::Count,
            "updated" => SortMode::Updated,
            _ => SortMode::Custom,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Custom => "カスタム",
            SortMode::Name => "名前順",
            SortMode::Count => "在庫数順",
            SortMode::Updated => "更新日順",
        }
    }
}

/// Flat list or sections per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    List,
    Grouped,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::List => "list",
            DisplayMode::Grouped => "grouped",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "grouped" => DisplayMode::Grouped,
            _ => DisplayMode::List,
        }
    }
}

/// Everything that decides which items are shown and in what order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub search: String,
    pub sort: SortMode,
    pub display: DisplayMode,
}

impl ItemQuery {
    /// Drag and drop only makes sense when the list shows the custom order
    pub fn allows_reorder(&self) -> bool {
        self.display == DisplayMode::List && self.sort == SortMode::Custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reorder_only_in_custom_list() {
        let mut query = ItemQuery::default();
        assert!(query.allows_reorder());
        query.sort = SortMode::Name;
        assert!(!query.allows_reorder());
        query.sort = SortMode::Custom;
        query.display = DisplayMode::Grouped;
        assert!(!query.allows_reorder());
    }

    #[test]
    fn test_mode_strings() {
        for mode in SortMode::ALL {
            assert_eq!(SortMode::from_str(mode.as_str()), mode);
        }
        assert_eq!(DisplayMode::from_str("anything"), DisplayMode::List);
    }
}
