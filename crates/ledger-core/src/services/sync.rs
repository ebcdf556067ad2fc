//! Sync Session
//!
//! Live mirror of one user's documents into [`InventoryState`]. Every
//! snapshot replaces its whole slice; there is no diffing.

use std::cell::RefCell;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{DomainResult, HistoryEntry, Item};
use crate::repository::{paths, Document, DocumentStore, OrderBy, Subscription};
use super::inventory::{InventoryService, InventoryState};

/// Which part of the state a snapshot replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Items,
    History,
    Categories,
}

/// Notified after a slice has been replaced
pub type ChangeListener = Rc<dyn Fn(Slice)>;

/// Owns the three live queries of a signed-in user.
/// Dropping the session unsubscribes them.
#[derive(Debug)]
pub struct SyncSession {
    uid: String,
    subscriptions: Vec<Subscription>,
}

impl SyncSession {
    /// Make sure the profile exists, then subscribe to items, history
    /// (newest first) and the profile's category set.
    pub async fn start<D: DocumentStore>(
        service: &InventoryService<D>,
        on_change: ChangeListener,
    ) -> DomainResult<Self> {
        let repo = service.repo();
        let uid = repo.uid().to_string();

        if repo.load_profile().await?.is_none() {
            let defaults = service.config().default_categories.clone();
            tracing::info!(uid = %uid, "creating profile with default categories");
            repo.save_categories(&defaults).await?;
        }

        let store = repo.store();
        let state = service.shared_state();
        let mut subscriptions = Vec::with_capacity(3);

        subscriptions.push(store.watch_collection(
            &paths::items_collection(&uid),
            None,
            replace_with(state.clone(), on_change.clone(), Slice::Items, |state, docs| {
                state.items = parse_documents::<Item>(docs, true);
            }),
        ));

        subscriptions.push(store.watch_collection(
            &paths::history_collection(&uid),
            Some(OrderBy::desc("timestamp")),
            replace_with(state.clone(), on_change.clone(), Slice::History, |state, docs| {
                state.history = parse_documents::<HistoryEntry>(docs, false);
            }),
        ));

        let profile_state = state;
        subscriptions.push(store.watch_doc(
            &paths::user_doc(&uid),
            Box::new(move |data: Option<Value>| {
                let Some(categories) = data.as_ref().and_then(categories_of) else {
                    return;
                };
                profile_state.borrow_mut().categories = categories;
                on_change(Slice::Categories);
            }),
        ));

        tracing::info!(uid = %uid, "sync started");
        Ok(Self { uid, subscriptions })
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Tear down all live queries
    pub fn stop(self) {
        tracing::info!(uid = %self.uid, "sync stopped");
        for subscription in self.subscriptions {
            subscription.cancel();
        }
    }
}

fn replace_with(
    state: Rc<RefCell<InventoryState>>,
    on_change: ChangeListener,
    slice: Slice,
    apply: impl Fn(&mut InventoryState, Vec<Document>) + 'static,
) -> Box<dyn Fn(Vec<Document>)> {
    Box::new(move |docs| {
        apply(&mut state.borrow_mut(), docs);
        on_change(slice);
    })
}

/// Deserialize snapshot documents, skipping malformed ones.
/// With `inject_id` the document id becomes the `id` field.
fn parse_documents<T: DeserializeOwned>(docs: Vec<Document>, inject_id: bool) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| {
            let mut data = doc.data;
            if inject_id {
                if let Value::Object(map) = &mut data {
                    map.insert("id".to_string(), Value::String(doc.id.clone()));
                }
            }
            serde_json::from_value(data)
                .map_err(|e| tracing::warn!(id = %doc.id, error = %e, "skipping malformed document"))
                .ok()
        })
        .collect()
}

fn categories_of(profile: &Value) -> Option<Vec<String>> {
    let list = profile.get("categories")?.as_array()?;
    Some(list.iter().filter_map(|c| c.as_str().map(str::to_string)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::AppConfig;
    use crate::domain::{ItemDraft, ItemQuery};
    use crate::repository::MemoryDocumentStore;
    use chrono::{Local, TimeZone};
    use serde_json::json;

    struct Fixture {
        store: MemoryDocumentStore,
        service: InventoryService<MemoryDocumentStore>,
        changes: Rc<RefCell<Vec<Slice>>>,
    }

    fn fixture() -> Fixture {
        let store = MemoryDocumentStore::new();
        let clock = FixedClock(Local.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap());
        let service = InventoryService::new(
            Rc::new(store.clone()),
            "u1",
            Rc::new(clock),
            Rc::new(AppConfig::default()),
        );
        Fixture { store, service, changes: Rc::new(RefCell::new(Vec::new())) }
    }

    async fn start(f: &Fixture) -> SyncSession {
        let changes = f.changes.clone();
        SyncSession::start(&f.service, Rc::new(move |slice| changes.borrow_mut().push(slice)))
            .await
            .expect("sync start")
    }

    fn draft(name: &str, count: u32) -> ItemDraft {
        ItemDraft {
            name: name.into(),
            category: "文房具".into(),
            count,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_start_creates_missing_profile_once() {
        let f = fixture();
        let session = start(&f).await;

        let profile = f.store.doc("users/u1").unwrap();
        assert_eq!(profile["categories"], json!(["文房具", "日用品", "食品"]));
        assert_eq!(f.service.categories().len(), 3);
        session.stop();

        f.service.add_category("薬").await.unwrap();
        let writes_before = f.store.writes().len();
        let _again = start(&f).await;
        assert_eq!(f.store.writes().len(), writes_before, "existing profile is not rewritten");
    }

    #[tokio::test]
    async fn test_existing_profile_is_merged_not_overwritten() {
        let f = fixture();
        f.store
            .set_doc("users/u1", json!({ "categories": ["工具"], "theme": "dark" }), false)
            .await
            .unwrap();
        let _session = start(&f).await;

        assert_eq!(f.service.categories(), vec!["工具".to_string()]);
        assert_eq!(f.store.doc("users/u1").unwrap()["theme"], "dark");
    }

    #[tokio::test]
    async fn test_snapshots_replace_slices() {
        let f = fixture();
        let _session = start(&f).await;
        f.changes.borrow_mut().clear();

        let created = f.service.save_item(draft("Pen", 2)).await.unwrap();
        assert_eq!(f.service.state().items.len(), 1);
        assert_eq!(f.service.state().history.len(), 1);
        assert!(f.changes.borrow().contains(&Slice::Items));
        assert!(f.changes.borrow().contains(&Slice::History));

        // A write from another device shows up as a full replacement
        f.store
            .set_doc("users/u1/items/other", json!({ "name": "Tape", "category": "文房具", "count": 1, "order": 1 }), false)
            .await
            .unwrap();
        let ids: Vec<_> = f.service.state().items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![created.id.clone(), "other".to_string()]);

        f.service.delete_item("other").await.unwrap();
        assert_eq!(f.service.state().items.len(), 1);
    }

    #[tokio::test]
    async fn test_history_newest_first_and_capped() {
        let f = fixture();
        let _session = start(&f).await;
        for ts in 0..120i64 {
            f.store
                .add_doc(
                    "users/u1/history",
                    json!({ "date": "", "itemName": "x", "action": "追加", "from": 0, "to": ts, "timestamp": ts }),
                )
                .await
                .unwrap();
        }
        let recent = f.service.recent_history();
        assert_eq!(recent.len(), 100);
        assert_eq!(recent[0].timestamp, 119);
        assert_eq!(recent[99].timestamp, 20);
    }

    #[tokio::test]
    async fn test_malformed_documents_are_skipped() {
        let f = fixture();
        f.store.set_doc("users/u1/items/bad", json!({ "count": "many" }), false).await.unwrap();
        f.store
            .set_doc("users/u1/items/good", json!({ "name": "Pen", "category": "文房具" }), false)
            .await
            .unwrap();
        let _session = start(&f).await;
        let state = f.service.state();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].id, "good");
    }

    #[tokio::test]
    async fn test_stop_tears_down_all_watches() {
        let f = fixture();
        let session = start(&f).await;
        assert_eq!(f.store.active_watches(), 3);

        session.stop();
        assert_eq!(f.store.active_watches(), 0);

        f.changes.borrow_mut().clear();
        f.store
            .set_doc("users/u1/items/x", json!({ "name": "Pen", "category": "文房具" }), false)
            .await
            .unwrap();
        assert!(f.changes.borrow().is_empty());
        assert!(f.service.state().items.is_empty());
    }

    #[tokio::test]
    async fn test_adjust_count_records_history() {
        let f = fixture();
        let _session = start(&f).await;
        let item = f.service.save_item(draft("Pen", 1)).await.unwrap();

        let down = f.service.adjust_count(&item.id, -1).await.unwrap().unwrap();
        assert_eq!(down.count, 0);
        assert!(f.service.adjust_count(&item.id, -1).await.unwrap().is_none());
        f.service.adjust_count(&item.id, 1).await.unwrap();

        let actions: Vec<_> = f.service.recent_history().iter().map(|h| (h.action, h.from, h.to)).collect();
        // equal timestamps keep insertion order reversed by the query
        assert_eq!(actions.len(), 3);
        assert!(actions.contains(&(crate::domain::HistoryAction::Create, 0, 1)));
        assert!(actions.contains(&(crate::domain::HistoryAction::Decrement, 1, 0)));
        assert!(actions.contains(&(crate::domain::HistoryAction::Increment, 0, 1)));
        assert_eq!(f.service.item(&item.id).unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_edit_records_update_with_previous_count() {
        let f = fixture();
        let _session = start(&f).await;
        let item = f.service.save_item(draft("Pen", 3)).await.unwrap();

        let mut edit = f.service.draft_for(&item.id).unwrap();
        edit.count = 7;
        edit.name = "Blue pen".into();
        let saved = f.service.save_item(edit).await.unwrap();

        assert_eq!(saved.id, item.id);
        assert_eq!(saved.order, item.order);
        let update = f
            .service
            .recent_history()
            .into_iter()
            .find(|h| h.action == crate::domain::HistoryAction::Update)
            .unwrap();
        assert_eq!((update.from, update.to), (3, 7));
        assert_eq!(f.service.state().items[0].name, "Blue pen");
    }

    #[tokio::test]
    async fn test_category_in_use_cannot_be_deleted() {
        let f = fixture();
        let _session = start(&f).await;
        f.service.save_item(draft("Pen", 1)).await.unwrap();

        let err = f.service.delete_category("文房具").await.unwrap_err();
        assert!(matches!(err, crate::domain::DomainError::Conflict(_)));

        f.service.delete_category("食品").await.unwrap();
        assert_eq!(f.service.categories(), vec!["文房具".to_string(), "日用品".to_string()]);
        let usage = f.service.category_usage();
        assert_eq!(usage, vec![("文房具".to_string(), true), ("日用品".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_failed_count_write_keeps_local_count() {
        let f = fixture();
        let _session = start(&f).await;
        let item = f.service.save_item(draft("Pen", 2)).await.unwrap();
        f.store.fail_writes_to(format!("users/u1/items/{}", item.id));

        assert!(f.service.adjust_count(&item.id, 1).await.is_err());
        assert_eq!(f.service.item(&item.id).unwrap().count, 2);
        assert_eq!(f.store.doc(&format!("users/u1/items/{}", item.id)).unwrap()["count"], 2);
    }

    #[tokio::test]
    async fn test_count_change_is_visible_without_a_session() {
        let f = fixture();
        let session = start(&f).await;
        let item = f.service.save_item(draft("Pen", 2)).await.unwrap();
        session.stop();

        let changed = f.service.adjust_count(&item.id, -1).await.unwrap().unwrap();
        assert_eq!(changed.count, 1);
        assert_eq!(f.service.item(&item.id).unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_failed_category_write_keeps_local_list() {
        let f = fixture();
        let _session = start(&f).await;
        f.store.fail_writes_to("users/u1");

        assert!(f.service.add_category("薬").await.is_err());
        assert!(f.service.delete_category("食品").await.is_err());
        assert_eq!(f.service.categories(), vec!["文房具", "日用品", "食品"]);
    }

    #[tokio::test]
    async fn test_add_category_ignores_duplicates() {
        let f = fixture();
        let _session = start(&f).await;
        assert!(!f.service.add_category("食品").await.unwrap());
        assert!(f.service.add_category(" 薬 ").await.unwrap());
        assert_eq!(f.store.doc("users/u1").unwrap()["categories"][3], "薬");
    }

    #[tokio::test]
    async fn test_reorder_writes_every_item() {
        let f = fixture();
        let _session = start(&f).await;
        let a = f.service.save_item(draft("A", 1)).await.unwrap();
        let b = f.service.save_item(draft("B", 1)).await.unwrap();
        let c = f.service.save_item(draft("C", 1)).await.unwrap();

        f.service.reorder(&c.id, &a.id, &ItemQuery::default()).await.unwrap();

        let names: Vec<_> = f
            .service
            .visible_items(&ItemQuery::default())
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        for (id, order) in [(&c.id, 0), (&a.id, 1), (&b.id, 2)] {
            let doc = f.store.doc(&format!("users/u1/items/{}", id)).unwrap();
            assert_eq!(doc["order"], order);
        }
    }

    #[tokio::test]
    async fn test_reorder_rejected_outside_custom_list() {
        let f = fixture();
        let _session = start(&f).await;
        let a = f.service.save_item(draft("A", 1)).await.unwrap();
        let b = f.service.save_item(draft("B", 1)).await.unwrap();
        let writes = f.store.writes().len();

        let query = ItemQuery { sort: crate::domain::SortMode::Name, ..Default::default() };
        assert!(f.service.reorder(&a.id, &b.id, &query).await.is_err());
        assert_eq!(f.store.writes().len(), writes);
    }

    #[tokio::test]
    async fn test_reorder_partial_failure_is_reported_after_all_writes() {
        let f = fixture();
        let _session = start(&f).await;
        let a = f.service.save_item(draft("A", 1)).await.unwrap();
        let b = f.service.save_item(draft("B", 1)).await.unwrap();
        let c = f.service.save_item(draft("C", 1)).await.unwrap();
        f.store.fail_writes_to(format!("users/u1/items/{}", a.id));

        let err = f.service.reorder(&a.id, &c.id, &ItemQuery::default()).await.unwrap_err();
        assert!(matches!(err, crate::domain::DomainError::PartialWrite { failed: 1, total: 3 }));

        // b and c got their new order, a kept its old one: inconsistent until retried
        assert_eq!(f.store.doc(&format!("users/u1/items/{}", b.id)).unwrap()["order"], 0);
        assert_eq!(f.store.doc(&format!("users/u1/items/{}", c.id)).unwrap()["order"], 1);
        assert_eq!(f.store.doc(&format!("users/u1/items/{}", a.id)).unwrap()["order"], 0);
    }

    #[tokio::test]
    async fn test_grouped_and_search() {
        let f = fixture();
        let _session = start(&f).await;
        f.service.save_item(draft("Red Pen", 1)).await.unwrap();
        f.service
            .save_item(ItemDraft { category: "食品".into(), ..draft("Rice", 5) })
            .await
            .unwrap();
        f.service
            .save_item(ItemDraft { category: "消えた".into(), ..draft("Old", 0) })
            .await
            .unwrap();

        let groups = f.service.grouped_items(&ItemQuery::default());
        let names: Vec<_> = groups.iter().map(|(c, items)| (c.as_str(), items.len())).collect();
        assert_eq!(names, vec![("文房具", 1), ("食品", 1), ("消えた", 1)]);

        let query = ItemQuery { search: "pen".into(), ..Default::default() };
        assert_eq!(f.service.visible_items(&query).len(), 1);

        let by_count = ItemQuery { sort: crate::domain::SortMode::Count, ..Default::default() };
        assert_eq!(f.service.visible_items(&by_count)[0].name, "Rice");
    }
}
