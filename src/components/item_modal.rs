//! Item Modal Component
//!
//! Create / edit form for one item, including links and image upload.

use leptos::prelude::*;
use leptos::task::spawn_local;
use ledger_core::domain::ItemDraft;
use ledger_core::services::Slice;
use wasm_bindgen::JsCast;

use crate::commands::{alert, compress_image, confirm};
use crate::context::use_stock;
use crate::store::{use_stock_store, StockViewStoreFields};

/// One editable link row; `key` stays stable while the row exists
#[derive(Clone, Copy)]
struct LinkRow {
    key: usize,
    label: RwSignal<String>,
    url: RwSignal<String>,
}

/// Shown while the store holds a draft
#[component]
pub fn ItemModalHost() -> impl IntoView {
    let store = use_stock_store();
    move || store.editing().get().map(|draft| view! { <ItemModal draft=draft /> })
}

#[component]
fn ItemModal(draft: ItemDraft) -> impl IntoView {
    let ctx = use_stock();
    let store = use_stock_store();

    let id = draft.id.clone();
    let is_new = id.is_none();
    let name = RwSignal::new(draft.name.clone());
    let category = RwSignal::new(draft.category.clone());
    let count = RwSignal::new(draft.count);
    let image = RwSignal::new(draft.image.clone());
    let next_key = StoredValue::new(draft.links.len());
    let links = RwSignal::new(
        draft
            .links
            .iter()
            .enumerate()
            .map(|(key, (label, url))| LinkRow {
                key,
                label: RwSignal::new(label.clone()),
                url: RwSignal::new(url.clone()),
            })
            .collect::<Vec<_>>(),
    );
    let saving = RwSignal::new(false);

    let close = move || store.editing().set(None);

    let add_link = move |_: web_sys::MouseEvent| {
        let key = next_key.get_value();
        next_key.set_value(key + 1);
        links.update(|rows| {
            rows.push(LinkRow {
                key,
                label: RwSignal::new(String::new()),
                url: RwSignal::new(String::new()),
            })
        });
    };

    let on_file = move |ev: web_sys::Event| {
        let file = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        let Some(file) = file else { return };
        let max_width = ctx.with(&[], |s| s.config().image_max_width);
        spawn_local(async move {
            match compress_image(&file, max_width).await {
                Ok(data_url) => {
                    image.try_set(Some(data_url));
                }
                Err(e) => alert(&e),
            }
        });
    };

    let save_id = id.clone();
    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let draft = ItemDraft {
            id: save_id.clone(),
            name: name.get_untracked(),
            category: category.get_untracked(),
            count: count.get_untracked(),
            image: image.get_untracked(),
            links: links
                .get_untracked()
                .iter()
                .map(|row| (row.label.get_untracked(), row.url.get_untracked()))
                .collect(),
        };
        saving.set(true);
        spawn_local(async move {
            match ctx.service().save_item(draft).await {
                Ok(_) => {
                    ctx.bump(Slice::Items);
                    store.editing().try_set(None);
                }
                Err(e) => {
                    alert(&e.to_string());
                    saving.try_set(false);
                }
            }
        });
    };

    let on_delete = move |_: web_sys::MouseEvent| {
        let Some(id) = id.clone() else { return };
        if !confirm("このアイテムを削除しますか？") {
            return;
        }
        spawn_local(async move {
            match ctx.service().delete_item(&id).await {
                Ok(()) => {
                    store.editing().try_set(None);
                }
                Err(e) => alert(&e.to_string()),
            }
        });
    };

    let categories = ctx.with(&[Slice::Categories], |s| s.categories());

    view! {
        <div class="modal-overlay" on:click=move |_| close()>
            <div class="modal" on:click=|ev| ev.stop_propagation()>
                <div class="modal-header">
                    <h2>{if is_new { "アイテムを追加" } else { "アイテムを編集" }}</h2>
                    <button type="button" class="close-modal-btn" on:click=move |_| close()>"×"</button>
                </div>
                <form class="item-form" on:submit=on_submit>
                    <label class="image-picker">
                        {move || match image.get() {
                            Some(src) => view! { <img class="image-preview" src=src /> }.into_any(),
                            None => view! { <span class="placeholder">"画像をアップロード"</span> }.into_any(),
                        }}
                        <input type="file" accept="image/*" class="hidden" on:change=on_file />
                    </label>

                    <label>"名前"
                        <input
                            type="text"
                            required
                            prop:value=move || name.get()
                            on:input=move |ev| name.set(event_target_value(&ev))
                        />
                    </label>

                    <label>"カテゴリ"
                        <select on:change=move |ev| category.set(event_target_value(&ev))>
                            {categories.into_iter().map(|c| {
                                let selected = c == category.get_untracked();
                                view! { <option value=c.clone() selected=selected>{c.clone()}</option> }
                            }).collect_view()}
                        </select>
                    </label>

                    <label>"在庫数"
                        <input
                            type="number"
                            min="0"
                            prop:value=move || count.get().to_string()
                            on:input=move |ev| count.set(event_target_value(&ev).parse().unwrap_or(0))
                        />
                    </label>

                    <div class="links-editor">
                        <span>"リンク"</span>
                        <For
                            each=move || links.get()
                            key=|row| row.key
                            children=move |row| view! {
                                <div class="link-row">
                                    <input
                                        type="text"
                                        placeholder="ラベル"
                                        prop:value=move || row.label.get()
                                        on:input=move |ev| row.label.set(event_target_value(&ev))
                                    />
                                    <input
                                        type="url"
                                        placeholder="https://..."
                                        prop:value=move || row.url.get()
                                        on:input=move |ev| row.url.set(event_target_value(&ev))
                                    />
                                    <button
                                        type="button"
                                        class="remove-link-btn"
                                        on:click=move |_| links.update(|rows| rows.retain(|r| r.key != row.key))
                                    >
                                        "×"
                                    </button>
                                </div>
                            }
                        />
                        <button type="button" class="add-link-btn" on:click=add_link>"＋ リンクを追加"</button>
                    </div>

                    <div class="modal-actions">
                        <Show when=move || !is_new>
                            <button type="button" class="delete-item-btn" on:click=on_delete.clone()>"削除"</button>
                        </Show>
                        <button type="submit" class="save-btn" disabled=move || saving.get()>"保存"</button>
                    </div>
                </form>
            </div>
        </div>
    }
}
