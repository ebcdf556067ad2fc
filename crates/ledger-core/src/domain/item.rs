//! Item Entity
//!
//! A stocked item: how many of something is on hand, where it belongs, and
//! where it sits in the user's custom ordering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Label used when a link is saved without a name
pub const DEFAULT_LINK_LABEL: &str = "リンク";

/// Named external link attached to an item (shop page, manual, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLink {
    pub label: String,
    pub url: String,
}

/// A stocked item, stored as `users/{uid}/items/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier (document id)
    pub id: String,
    pub name: String,
    pub category: String,
    /// Units on hand, never negative
    #[serde(default)]
    pub count: u32,
    /// Image URL or data URL
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub links: Vec<ItemLink>,
    /// Position in the custom sort
    #[serde(default)]
    pub order: i64,
    #[serde(default, with = "lenient_date")]
    pub last_updated: Option<NaiveDate>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            count: 0,
            image: None,
            links: Vec::new(),
            order: 0,
            last_updated: None,
        }
    }

    /// Apply a +/- step, clamping at zero. Returns the previous count.
    pub fn step_count(&mut self, delta: i32) -> u32 {
        let prev = self.count;
        self.count = (i64::from(prev) + i64::from(delta)).clamp(0, i64::from(u32::MAX)) as u32;
        prev
    }
}

impl Entity for Item {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

/// Form contents for creating (`id == None`) or editing an item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub count: u32,
    pub image: Option<String>,
    /// (label, url) pairs as typed in the form
    pub links: Vec<(String, String)>,
}

impl ItemDraft {
    /// Prefill a draft from an existing item
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: Some(item.id.clone()),
            name: item.name.clone(),
            category: item.category.clone(),
            count: item.count,
            image: item.image.clone(),
            links: item.links.iter().map(|l| (l.label.clone(), l.url.clone())).collect(),
        }
    }

    /// Links with a URL, unnamed ones labelled with the default
    pub fn cleaned_links(&self) -> Vec<ItemLink> {
        self.links
            .iter()
            .filter(|(_, url)| !url.trim().is_empty())
            .map(|(label, url)| ItemLink {
                label: if label.trim().is_empty() {
                    DEFAULT_LINK_LABEL.to_string()
                } else {
                    label.trim().to_string()
                },
                url: url.trim().to_string(),
            })
            .collect()
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Dates are written as `YYYY-MM-DD`; older documents carry `YYYY/M/D`.
mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.and_then(|s| {
            FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_count_clamps_at_zero() {
        let mut item = Item::new("1", "Pen", "文房具");
        assert_eq!(item.step_count(-1), 0);
        assert_eq!(item.count, 0);
        item.step_count(1);
        item.step_count(1);
        assert_eq!(item.count, 2);
    }

    #[test]
    fn test_deserialize_legacy_document() {
        let doc = json!({
            "id": "1700000000000",
            "name": "Tape",
            "category": "文房具",
            "count": 3,
            "image": "",
            "lastUpdated": "2024/1/5"
        });
        let item: Item = serde_json::from_value(doc).unwrap();
        assert_eq!(item.image, None);
        assert_eq!(item.order, 0);
        assert!(item.links.is_empty());
        assert_eq!(item.last_updated, NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let mut item = Item::new("1", "Tape", "文房具");
        item.last_updated = NaiveDate::from_ymd_opt(2024, 3, 9);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["lastUpdated"], "2024-03-09");
        assert!(value.get("image").is_none());
    }

    #[test]
    fn test_cleaned_links() {
        let draft = ItemDraft {
            links: vec![
                ("".into(), "https://example.com".into()),
                ("Manual".into(), "".into()),
                ("Shop".into(), " https://shop.example ".into()),
            ],
            ..Default::default()
        };
        let links = draft.cleaned_links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].label, DEFAULT_LINK_LABEL);
        assert_eq!(links[1].url, "https://shop.example");
    }
}
