//! Category Admin Component
//!
//! Stock category list with add and (guarded) delete.

use leptos::prelude::*;
use leptos::task::spawn_local;
use ledger_core::services::Slice;

use crate::commands::alert;
use crate::components::DeleteConfirmButton;
use crate::context::use_stock;

#[component]
pub fn CategoryAdmin() -> impl IntoView {
    let ctx = use_stock();
    let (new_name, set_new_name) = signal(String::new());

    let on_add = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get_untracked();
        if name.trim().is_empty() {
            return;
        }
        spawn_local(async move {
            match ctx.service().add_category(&name).await {
                Ok(true) => {
                    ctx.bump(Slice::Categories);
                    set_new_name.try_set(String::new());
                }
                Ok(false) => alert("そのカテゴリはすでに存在します。"),
                Err(e) => alert(&e.to_string()),
            }
        });
    };

    let usage = move || ctx.with(&[Slice::Items, Slice::Categories], |s| s.category_usage());

    view! {
        <section class="category-admin">
            <h2>"カテゴリ管理"</h2>
            <form class="category-add-form" on:submit=on_add>
                <input
                    type="text"
                    placeholder="新しいカテゴリ"
                    prop:value=move || new_name.get()
                    on:input=move |ev| set_new_name.set(event_target_value(&ev))
                />
                <button type="submit">"追加"</button>
            </form>
            <ul class="category-list-admin">
                {move || usage().into_iter().map(|(name, in_use)| {
                    let target = name.clone();
                    view! {
                        <li class="category-row">
                            <span>{name.clone()}</span>
                            <DeleteConfirmButton
                                button_class="delete-category-btn"
                                disabled=in_use
                                title=if in_use { "使用中のカテゴリは削除できません" } else { "削除" }
                                on_confirm=move |_| {
                                    let target = target.clone();
                                    spawn_local(async move {
                                        match ctx.service().delete_category(&target).await {
                                            Ok(()) => ctx.bump(Slice::Categories),
                                            Err(e) => alert(&e.to_string()),
                                        }
                                    });
                                }
                            />
                        </li>
                    }
                }).collect_view()}
            </ul>
        </section>
    }
}
