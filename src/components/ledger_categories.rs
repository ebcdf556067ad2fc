//! Ledger Categories Component

use leptos::prelude::*;

use crate::commands::alert;
use crate::components::DeleteConfirmButton;
use crate::context::use_warikan;

#[component]
pub fn LedgerCategories() -> impl IntoView {
    let ctx = use_warikan();
    let (new_name, set_new_name) = signal(String::new());

    let on_add = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get_untracked();
        match ctx.mutate(|l| l.add_category(&name)) {
            Some(true) => set_new_name.set(String::new()),
            Some(false) => alert("そのカテゴリはすでに存在します。"),
            None => {}
        }
    };

    view! {
        <details class="ledger-categories">
            <summary>"カテゴリ管理"</summary>
            <form on:submit=on_add>
                <input
                    type="text"
                    placeholder="新しいカテゴリ"
                    prop:value=move || new_name.get()
                    on:input=move |ev| set_new_name.set(event_target_value(&ev))
                />
                <button type="submit">"追加"</button>
            </form>
            <ul>
                {move || ctx.with(|l| {
                    l.categories()
                        .into_iter()
                        .map(|c| {
                            let in_use = l.category_in_use(&c);
                            (c, in_use)
                        })
                        .collect::<Vec<_>>()
                }).into_iter().map(|(name, in_use)| {
                    let target = name.clone();
                    view! {
                        <li>
                            <span>{name}</span>
                            <DeleteConfirmButton
                                button_class="delete-category-btn"
                                disabled=in_use
                                on_confirm=move |_| {
                                    ctx.mutate(|l| l.delete_category(&target));
                                }
                            />
                        </li>
                    }
                }).collect_view()}
            </ul>
        </details>
    }
}
