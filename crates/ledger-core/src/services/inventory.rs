//! Inventory Service
//!
//! The Stock app's state and its only mutation entry points. Remote writes
//! go through [`InventoryRepository`]; the in-memory slices are replaced by
//! the sync session whenever a snapshot arrives.

use std::cell::{Ref, RefCell};
use std::cmp::Reverse;
use std::rc::Rc;

use futures::future::join_all;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::domain::{
    DisplayMode, DomainError, DomainResult, HistoryAction, HistoryEntry, Item, ItemDraft,
    ItemQuery, SortMode,
};
use crate::repository::{DocumentStore, InventoryRepository};

/// The three synced slices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryState {
    pub items: Vec<Item>,
    /// Newest first
    pub history: Vec<HistoryEntry>,
    pub categories: Vec<String>,
}

pub struct InventoryService<D: DocumentStore> {
    repo: InventoryRepository<D>,
    state: Rc<RefCell<InventoryState>>,
    clock: Rc<dyn Clock>,
    config: Rc<AppConfig>,
}

impl<D: DocumentStore> Clone for InventoryService<D> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            state: self.state.clone(),
            clock: self.clock.clone(),
            config: self.config.clone(),
        }
    }
}

impl<D: DocumentStore> InventoryService<D> {
    pub fn new(store: Rc<D>, uid: impl Into<String>, clock: Rc<dyn Clock>, config: Rc<AppConfig>) -> Self {
        let state = InventoryState {
            categories: config.default_categories.clone(),
            ..Default::default()
        };
        Self {
            repo: InventoryRepository::new(store, uid),
            state: Rc::new(RefCell::new(state)),
            clock,
            config,
        }
    }

    pub(crate) fn repo(&self) -> &InventoryRepository<D> {
        &self.repo
    }

    pub(crate) fn shared_state(&self) -> Rc<RefCell<InventoryState>> {
        self.state.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> Ref<'_, InventoryState> {
        self.state.borrow()
    }

    pub fn item(&self, id: &str) -> Option<Item> {
        self.state.borrow().items.iter().find(|i| i.id == id).cloned()
    }

    pub fn categories(&self) -> Vec<String> {
        self.state.borrow().categories.clone()
    }

    /// Items matching the search, in the requested order
    pub fn visible_items(&self, query: &ItemQuery) -> Vec<Item> {
        let needle = query.search.trim().to_lowercase();
        let mut items: Vec<Item> = self
            .state
            .borrow()
            .items
            .iter()
            .filter(|i| needle.is_empty() || i.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        sort_items(&mut items, query.sort);
        items
    }

    /// Visible items split into sections by category.
    ///
    /// Sections follow the category set; categories no longer in the set
    /// follow in order of appearance. Empty sections are omitted.
    pub fn grouped_items(&self, query: &ItemQuery) -> Vec<(String, Vec<Item>)> {
        let mut groups: Vec<(String, Vec<Item>)> = self
            .categories()
            .into_iter()
            .map(|c| (c, Vec::new()))
            .collect();
        for item in self.visible_items(query) {
            match groups.iter_mut().find(|(c, _)| *c == item.category) {
                Some((_, items)) => items.push(item),
                None => groups.push((item.category.clone(), vec![item])),
            }
        }
        groups.retain(|(_, items)| !items.is_empty());
        groups
    }

    /// The newest history entries, up to the configured limit
    pub fn recent_history(&self) -> Vec<HistoryEntry> {
        self.state
            .borrow()
            .history
            .iter()
            .take(self.config.history_limit)
            .cloned()
            .collect()
    }

    /// Each category with whether any item uses it
    pub fn category_usage(&self) -> Vec<(String, bool)> {
        let state = self.state.borrow();
        state
            .categories
            .iter()
            .map(|c| (c.clone(), state.items.iter().any(|i| &i.category == c)))
            .collect()
    }

    pub fn draft_for(&self, id: &str) -> Option<ItemDraft> {
        self.item(id).map(|item| ItemDraft::from_item(&item))
    }

    /// Create or overwrite an item from the edit form.
    ///
    /// The history record is written first, then the item document.
    pub async fn save_item(&self, draft: ItemDraft) -> DomainResult<Item> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("名前を入力してください。".into()));
        }
        let now = self.clock.now();

        let (item, history) = {
            let state = self.state.borrow();
            let existing = draft
                .id
                .as_deref()
                .filter(|id| !id.is_empty())
                .map(|id| (id.to_string(), state.items.iter().find(|i| i.id == id)));

            let mut item = Item::new(String::new(), name, draft.category.clone());
            item.count = draft.count;
            item.image = draft.image.clone().filter(|s| !s.is_empty());
            item.links = draft.cleaned_links();
            item.last_updated = Some(now.date_naive());

            let history = match existing {
                Some((id, old)) => {
                    item.id = id;
                    item.order = old.map_or(state.items.len() as i64, |o| o.order);
                    HistoryEntry::record(now, name, HistoryAction::Update, old.map_or(0, |o| o.count), item.count)
                }
                None => {
                    item.id = next_item_id(now.timestamp_millis(), &state.items);
                    item.order = state.items.len() as i64;
                    HistoryEntry::record(now, name, HistoryAction::Create, 0, item.count)
                }
            };
            (item, history)
        };

        self.repo.append_history(&history).await?;
        self.repo.save_item(&item).await?;
        tracing::info!(id = %item.id, action = history.action.label(), "item saved");
        Ok(item)
    }

    /// Step an item's count by `delta`, never below zero.
    ///
    /// Returns `None` when the count did not change (already zero).
    pub async fn adjust_count(&self, id: &str, delta: i32) -> DomainResult<Option<Item>> {
        let now = self.clock.now();
        let mut item = self
            .item(id)
            .ok_or_else(|| DomainError::NotFound(format!("item {}", id)))?;
        let prev = item.step_count(delta);
        if prev == item.count {
            return Ok(None);
        }
        item.last_updated = Some(now.date_naive());
        let action = if delta > 0 { HistoryAction::Increment } else { HistoryAction::Decrement };
        let history = HistoryEntry::record(now, item.name.clone(), action, prev, item.count);

        self.repo.append_history(&history).await?;
        self.repo.save_item(&item).await?;
        self.commit_item(&item);
        Ok(Some(item))
    }

    /// Put a written item into the local state unless a snapshot already did
    fn commit_item(&self, item: &Item) {
        let mut state = self.state.borrow_mut();
        if let Some(slot) = state.items.iter_mut().find(|i| i.id == item.id) {
            *slot = item.clone();
        }
    }

    pub async fn delete_item(&self, id: &str) -> DomainResult<()> {
        self.repo.delete_item(id).await?;
        tracing::info!(id, "item deleted");
        Ok(())
    }

    /// Add a category. Returns `false` when it already exists.
    pub async fn add_category(&self, name: &str) -> DomainResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("カテゴリ名を入力してください。".into()));
        }
        let mut categories = self.categories();
        if categories.iter().any(|c| c == name) {
            return Ok(false);
        }
        categories.push(name.to_string());
        self.repo.save_categories(&categories).await?;
        self.state.borrow_mut().categories = categories;
        Ok(true)
    }

    /// Remove a category that no item uses
    pub async fn delete_category(&self, name: &str) -> DomainResult<()> {
        let categories = {
            let state = self.state.borrow();
            if state.items.iter().any(|i| i.category == name) {
                return Err(DomainError::Conflict(format!("「{}」は使用中のため削除できません。", name)));
            }
            if !state.categories.iter().any(|c| c == name) {
                return Err(DomainError::NotFound(format!("category {}", name)));
            }
            state.categories.iter().filter(|c| *c != name).cloned().collect::<Vec<_>>()
        };
        self.repo.save_categories(&categories).await?;
        self.state.borrow_mut().categories = categories;
        Ok(())
    }

    /// Move `dragged_id` to `target_id`'s position in the custom order and
    /// persist every item's new `order`.
    ///
    /// All writes are issued together and none is rolled back; when some
    /// fail the error is reported after the rest have completed.
    pub async fn reorder(&self, dragged_id: &str, target_id: &str, query: &ItemQuery) -> DomainResult<()> {
        if !query.allows_reorder() {
            return Err(DomainError::InvalidInput(
                "並び替えはリスト表示・カスタム順のときのみ可能です。".into(),
            ));
        }

        let reordered = {
            let mut state = self.state.borrow_mut();
            match reorder_items(&state.items, dragged_id, target_id) {
                Some(items) => {
                    state.items = items.clone();
                    items
                }
                None => return Ok(()),
            }
        };

        let total = reordered.len();
        let results = join_all(reordered.iter().map(|item| self.repo.save_item(item))).await;
        let failed = results
            .iter()
            .zip(&reordered)
            .filter_map(|(result, item)| result.as_ref().err().map(|e| (item, e)))
            .inspect(|(item, e)| tracing::warn!(id = %item.id, error = %e, "order write failed"))
            .count();

        if failed > 0 {
            return Err(DomainError::PartialWrite { failed, total });
        }
        tracing::debug!(dragged_id, target_id, total, "items reordered");
        Ok(())
    }
}

fn sort_items(items: &mut [Item], sort: SortMode) {
    match sort {
        SortMode::Name => items.sort_by_cached_key(|i| (name_sort_key(&i.name), i.name.clone())),
        SortMode::Count => items.sort_by_key(|i| Reverse(i.count)),
        SortMode::Updated => items.sort_by_key(|i| Reverse(i.last_updated)),
        SortMode::Custom => items.sort_by_key(|i| i.order),
    }
}

/// Collation key for names: katakana folds to hiragana, full-width ASCII
/// to half-width, then lowercase. Kanji keep code point order.
fn name_sort_key(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Millisecond timestamp as id, bumped until it is unused
pub fn next_item_id(now_millis: i64, items: &[Item]) -> String {
    let mut candidate = now_millis;
    while items.iter().any(|i| i.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

/// Array move in custom order: the dragged item is taken out and reinserted
/// at the target's index, then every `order` is rewritten to its index.
///
/// `None` when either id is unknown or both are the same item.
pub fn reorder_items(items: &[Item], dragged_id: &str, target_id: &str) -> Option<Vec<Item>> {
    if dragged_id == target_id {
        return None;
    }
    let mut ordered = items.to_vec();
    ordered.sort_by_key(|i| i.order);

    let from = ordered.iter().position(|i| i.id == dragged_id)?;
    let to = ordered.iter().position(|i| i.id == target_id)?;
    let moved = ordered.remove(from);
    ordered.insert(to, moved);

    for (index, item) in ordered.iter_mut().enumerate() {
        item.order = index as i64;
    }
    Some(ordered)
}

/// Size of an image scaled down to `max_width`, keeping the aspect ratio
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round() as u32;
    (max_width, scaled)
}

/// Whether reordering is possible for the current view
pub fn reorder_hint(display: DisplayMode, sort: SortMode) -> Option<&'static str> {
    match (display, sort) {
        (DisplayMode::List, SortMode::Custom) => None,
        (DisplayMode::Grouped, _) => Some("グループ表示中は並び替えできません"),
        _ => Some("カスタム順のときのみ並び替えできます"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn items(ids: &[&str]) -> Vec<Item> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                let mut item = Item::new(*id, format!("Item {}", id), "文房具");
                item.order = i as i64;
                item
            })
            .collect()
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_move_down_lands_on_target_index() {
        let moved = reorder_items(&items(&["a", "b", "c", "d"]), "a", "c").unwrap();
        assert_eq!(ids(&moved), vec!["b", "c", "a", "d"]);
        assert!(moved.iter().enumerate().all(|(i, item)| item.order == i as i64));
    }

    #[test]
    fn test_move_up_is_not_a_swap() {
        let moved = reorder_items(&items(&["a", "b", "c", "d"]), "d", "b").unwrap();
        assert_eq!(ids(&moved), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_uses_custom_order_not_storage_order() {
        let mut list = items(&["a", "b", "c"]);
        list[0].order = 2;
        list[2].order = 0;
        // custom order is c, b, a
        let moved = reorder_items(&list, "c", "a").unwrap();
        assert_eq!(ids(&moved), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_noop_cases() {
        let list = items(&["a", "b"]);
        assert!(reorder_items(&list, "a", "a").is_none());
        assert!(reorder_items(&list, "a", "zz").is_none());
    }

    #[test]
    fn test_name_sort_folds_kana_and_width() {
        assert_eq!(name_sort_key("カッター"), name_sort_key("かったー"));
        assert_eq!(name_sort_key("ＰＥＮ"), "pen");

        let mut list = items(&["1", "2", "3", "4"]);
        list[0].name = "ノート".into();
        list[1].name = "えんぴつ".into();
        list[2].name = "Ｂox".into();
        list[3].name = "apple".into();
        sort_items(&mut list, SortMode::Name);
        let names: Vec<_> = list.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "Ｂox", "えんぴつ", "ノート"]);
    }

    #[test]
    fn test_next_item_id_skips_taken() {
        let list = items(&["1000", "1001"]);
        assert_eq!(next_item_id(1000, &list), "1002");
        assert_eq!(next_item_id(5, &list), "5");
    }

    #[test]
    fn test_scaled_dimensions() {
        assert_eq!(scaled_dimensions(800, 600, 400), (400, 300));
        assert_eq!(scaled_dimensions(300, 900, 400), (300, 900));
        assert_eq!(scaled_dimensions(1000, 333, 400), (400, 133));
    }

    #[test]
    fn test_reorder_hint() {
        assert_eq!(reorder_hint(DisplayMode::List, SortMode::Custom), None);
        assert!(reorder_hint(DisplayMode::Grouped, SortMode::Custom).is_some());
        assert!(reorder_hint(DisplayMode::List, SortMode::Count).is_some());
    }

    proptest! {
        #[test]
        fn prop_reorder_preserves_membership(n in 2usize..20, from in 0usize..20, to in 0usize..20) {
            let names: Vec<String> = (0..n).map(|i| format!("id{}", i)).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let list = items(&refs);
            let (from, to) = (from % n, to % n);
            prop_assume!(from != to);

            let moved = reorder_items(&list, &names[from], &names[to]).unwrap();
            let mut before: Vec<_> = list.iter().map(|i| i.id.clone()).collect();
            let mut after: Vec<_> = moved.iter().map(|i| i.id.clone()).collect();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
            prop_assert_eq!(&moved[to].id, &names[from]);
        }
    }
}
