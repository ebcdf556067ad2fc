//! Item Board Component
//!
//! Search/sort/display controls and the item cards, as one list (draggable
//! in custom order) or in sections per category.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{bind_global_mouseup, make_on_mousedown, make_on_mouseenter, make_on_mouseleave, DndSignals};
use ledger_core::domain::{DisplayMode, Item, ItemDraft, SortMode};
use ledger_core::services::{reorder_hint, Slice};

use crate::commands::alert;
use crate::context::use_stock;
use crate::store::{current_query, current_query_untracked, use_stock_store, StockViewStoreFields};

#[component]
pub fn ItemBoard() -> impl IntoView {
    let ctx = use_stock();
    let store = use_stock_store();
    let dnd = DndSignals::<String>::new();

    let listeners = bind_global_mouseup(dnd, move |dragged: String, target: String| {
        let Some(query) = current_query_untracked(&store) else {
            return;
        };
        ctx.bump(Slice::Items);
        spawn_local(async move {
            if let Err(e) = ctx.service().reorder(&dragged, &target, &query).await {
                tracing::warn!(error = %e, "reorder failed");
                alert(&e.to_string());
            }
            ctx.bump(Slice::Items);
        });
    });
    let _listeners = StoredValue::new_local(listeners);

    let reorder_enabled = move || store.display().get() == DisplayMode::List && store.sort().get() == SortMode::Custom;
    let item_count = move || ctx.with(&[Slice::Items], |s| s.state().items.len());

    let open_new = move |_: web_sys::MouseEvent| {
        let category = ctx.with(&[], |s| s.categories().into_iter().next().unwrap_or_default());
        store.editing().set(Some(ItemDraft { category, ..Default::default() }));
    };

    view! {
        <section class="item-board">
            <div class="controls">
                <input
                    type="search"
                    class="search-input"
                    placeholder="アイテムを検索..."
                    prop:value=move || store.search().get()
                    on:input=move |ev| store.search().set(event_target_value(&ev))
                />
                <select
                    class="sort-select"
                    on:change=move |ev| store.sort().set(SortMode::from_str(&event_target_value(&ev)))
                >
                    {SortMode::ALL.into_iter().map(|mode| view! {
                        <option value=mode.as_str() selected=move || store.sort().get() == mode>
                            {mode.label()}
                        </option>
                    }).collect_view()}
                </select>
                <select
                    class="display-mode-select"
                    on:change=move |ev| store.display().set(DisplayMode::from_str(&event_target_value(&ev)))
                >
                    <option value="list" selected=move || store.display().get() == DisplayMode::List>"リスト"</option>
                    <option value="grouped" selected=move || store.display().get() == DisplayMode::Grouped>"カテゴリ別"</option>
                </select>
                <span class="item-count-badge">{move || format!("{}件", item_count())}</span>
                <button type="button" class="add-item-btn" on:click=open_new>"＋ 追加"</button>
            </div>

            {move || reorder_hint(store.display().get(), store.sort().get()).map(|hint| view! {
                <p class="reorder-hint">{hint}</p>
            })}

            {move || {
                let query = current_query(&store);
                if query.display == DisplayMode::Grouped {
                    let groups = ctx.with(&[Slice::Items, Slice::Categories], |s| s.grouped_items(&query));
                    groups.into_iter().map(|(category, items)| {
                        let count = items.len();
                        view! {
                            <div class="category-group">
                                <h2 class="category-header">
                                    {category}
                                    <span class="category-count">{count}</span>
                                </h2>
                                <div class="item-list">
                                    {items.into_iter().map(|item| view! {
                                        <ItemCard item=item dnd=dnd draggable=Signal::stored(false) />
                                    }).collect_view()}
                                </div>
                            </div>
                        }
                    }).collect_view().into_any()
                } else {
                    let items = ctx.with(&[Slice::Items], |s| s.visible_items(&query));
                    if items.is_empty() {
                        return view! { <p class="empty-state">"アイテムがありません"</p> }.into_any();
                    }
                    view! {
                        <div class="item-list">
                            {items.into_iter().map(|item| view! {
                                <ItemCard item=item dnd=dnd draggable=Signal::derive(reorder_enabled) />
                            }).collect_view()}
                        </div>
                    }.into_any()
                }
            }}
        </section>
    }
}

#[component]
fn ItemCard(item: Item, dnd: DndSignals<String>, draggable: Signal<bool>) -> impl IntoView {
    let ctx = use_stock();
    let store = use_stock_store();
    let id = item.id.clone();

    let on_mousedown = make_on_mousedown(dnd, id.clone());
    let on_mouseenter = make_on_mouseenter(dnd, id.clone());
    let on_mouseleave = make_on_mouseleave(dnd);

    let card_class = {
        let (a, b) = (id.clone(), id.clone());
        move || {
            let mut class = String::from("item-card");
            if draggable.get() {
                class.push_str(" draggable");
            }
            if dnd.is_dragging(&a) {
                class.push_str(" dragging");
            }
            if dnd.is_over(&b) {
                class.push_str(" drag-over");
            }
            class
        }
    };

    let open_edit = {
        let id = id.clone();
        move |_: web_sys::MouseEvent| {
            if dnd.just_ended.get_untracked() {
                return;
            }
            if let Some(draft) = ctx.with(&[], |s| s.draft_for(&id)) {
                store.editing().set(Some(draft));
            }
        }
    };

    let adjust = move |delta: i32| {
        let id = id.clone();
        move |_: web_sys::MouseEvent| {
            let id = id.clone();
            spawn_local(async move {
                match ctx.service().adjust_count(&id, delta).await {
                    Ok(Some(_)) => ctx.bump(Slice::Items),
                    Ok(None) => {}
                    Err(e) => alert(&e.to_string()),
                }
            });
        }
    };
    let decrement = adjust(-1);
    let increment = adjust(1);

    let placeholder = ctx.with(&[], |s| s.config().placeholder_image.clone());
    let image = item.image.clone().unwrap_or(placeholder);
    let updated = item
        .last_updated
        .map(|d| format!("最終更新: {}", d.format("%Y/%m/%d")))
        .unwrap_or_default();

    view! {
        <div
            class=card_class
            on:mousedown=move |ev| if draggable.get_untracked() { on_mousedown(ev) }
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
        >
            <img class="item-image edit-trigger" src=image alt=item.name.clone() on:click=open_edit.clone() />
            <div class="item-info">
                <span class="item-category">{item.category.clone()}</span>
                <h3 class="item-name edit-trigger" on:click=open_edit>{item.name.clone()}</h3>
                <div class="item-links">
                    {item.links.iter().map(|link| view! {
                        <a href=link.url.clone() target="_blank" rel="noopener">{link.label.clone()}</a>
                    }).collect_view()}
                </div>
                <span class="item-updated">{updated}</span>
            </div>
            <div class="count-controls">
                <button type="button" class="count-btn minus" on:click=decrement>"−"</button>
                <span class="item-count">{item.count}</span>
                <button type="button" class="count-btn plus" on:click=increment>"＋"</button>
            </div>
        </div>
    }
}
