//! Repository Integration Tests
//!
//! Tests for the in-memory stores and the repositories built on them.

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use crate::domain::{HistoryAction, HistoryEntry, Item, LedgerEntry};
    use crate::repository::{
        paths, DocumentStore, InventoryRepository, KeyValueStorage, MemoryDocumentStore,
        MemoryStorage, OrderBy, ProjectRepository,
    };

    fn setup_inventory() -> (MemoryDocumentStore, InventoryRepository<MemoryDocumentStore>) {
        let store = MemoryDocumentStore::new();
        let repo = InventoryRepository::new(Rc::new(store.clone()), "u1");
        (store, repo)
    }

    #[tokio::test]
    async fn test_save_and_delete_item() {
        let (store, repo) = setup_inventory();

        let item = Item::new("10", "Pen", "文房具");
        repo.save_item(&item).await.expect("save failed");
        assert_eq!(store.doc("users/u1/items/10").unwrap()["name"], "Pen");

        repo.delete_item("10").await.expect("delete failed");
        assert!(store.doc("users/u1/items/10").is_none());
    }

    #[tokio::test]
    async fn test_save_categories_merges_profile() {
        let (store, repo) = setup_inventory();
        store
            .set_doc("users/u1", json!({ "displayName": "kei", "categories": ["a"] }), false)
            .await
            .unwrap();

        repo.save_categories(&["a".to_string(), "b".to_string()]).await.unwrap();

        let profile = store.doc("users/u1").unwrap();
        assert_eq!(profile["displayName"], "kei");
        assert_eq!(profile["categories"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_history_watch_is_ordered_newest_first() {
        let (store, repo) = setup_inventory();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = store.watch_collection(
            &paths::history_collection("u1"),
            Some(OrderBy::desc("timestamp")),
            Box::new(move |docs| {
                *sink.borrow_mut() = docs.iter().map(|d| d.data["to"].as_u64().unwrap()).collect();
            }),
        );

        for (ts, to) in [(100, 1), (300, 3), (200, 2)] {
            let mut entry = HistoryEntry {
                date: String::new(),
                item_name: "Pen".into(),
                action: HistoryAction::Increment,
                from: 0,
                to,
                timestamp: 0,
            };
            entry.timestamp = ts;
            repo.append_history(&entry).await.unwrap();
        }

        assert_eq!(*seen.borrow(), vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_collection_watch_ignores_nested_and_sibling_paths() {
        let store = MemoryDocumentStore::new();
        store.set_doc("users/u1/items/a", json!({"n": 1}), false).await.unwrap();
        store.set_doc("users/u1/items/a/extra/x", json!({}), false).await.unwrap();
        store.set_doc("users/u1/itemsX/b", json!({}), false).await.unwrap();

        let docs = store.collection("users/u1/items");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "a");
    }

    #[tokio::test]
    async fn test_cancelled_watch_stops_firing() {
        let store = MemoryDocumentStore::new();
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let sub = store.watch_doc("users/u1", Box::new(move |_| *counter.borrow_mut() += 1));
        assert_eq!(*calls.borrow(), 1);

        sub.cancel();
        store.set_doc("users/u1", json!({}), false).await.unwrap();
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(store.active_watches(), 0);
    }

    #[tokio::test]
    async fn test_failing_path_rejects_writes() {
        let (store, repo) = setup_inventory();
        store.fail_writes_to("users/u1/items/1");

        let err = repo.save_item(&Item::new("1", "Pen", "文房具")).await.unwrap_err();
        assert!(err.to_string().contains("permission-denied"));
        assert!(store.doc("users/u1/items/1").is_none());
    }

    #[test]
    fn test_project_repository_round_trip() {
        let storage = MemoryStorage::new();
        let repo = ProjectRepository::new(Rc::new(storage.clone()));

        repo.save_project_names(&["trip".to_string()]).unwrap();
        repo.save_entries("trip", &[LedgerEntry::new("2024-05-01", "A", 300)]).unwrap();
        repo.set_last_project("trip").unwrap();

        assert_eq!(repo.project_names(), vec!["trip".to_string()]);
        assert_eq!(repo.load_entries("trip")[0].amount, 300);
        assert_eq!(repo.last_project().as_deref(), Some("trip"));
        assert_eq!(storage.get("projectList").as_deref(), Some(r#"["trip"]"#));
    }

    #[test]
    fn test_corrupt_values_read_as_empty() {
        let storage = MemoryStorage::new();
        storage.set("projectList", "not json").unwrap();
        storage.set("trip", "{").unwrap();
        let repo = ProjectRepository::new(Rc::new(storage));

        assert!(repo.project_names().is_empty());
        assert!(repo.load_entries("trip").is_empty());
        assert!(repo.load_entries("missing").is_empty());
        assert_eq!(repo.categories(), None);
    }
}
