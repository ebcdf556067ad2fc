//! Entry Form Component

use leptos::prelude::*;

use crate::context::use_warikan;

#[component]
pub fn EntryForm() -> impl IntoView {
    let ctx = use_warikan();
    let draft = ctx.draft;

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let input = draft.get_untracked();
        if ctx.mutate(|l| l.add_entry(input)).is_some() {
            draft.update(|d| d.clear_for_next());
        }
    };

    let payers = move || ctx.with(|l| l.payers());
    let categories = move || ctx.with(|l| l.categories());

    view! {
        <form class="entry-form" on:submit=on_submit>
            <input
                type="date"
                prop:value=move || draft.with(|d| d.date.clone())
                on:input=move |ev| draft.update(|d| d.date = event_target_value(&ev))
            />
            <input
                type="text"
                placeholder="支払い者"
                list="payer-options"
                prop:value=move || draft.with(|d| d.payer.clone())
                on:input=move |ev| draft.update(|d| d.payer = event_target_value(&ev))
            />
            <datalist id="payer-options">
                {move || payers().into_iter().map(|p| view! { <option value=p /> }).collect_view()}
            </datalist>
            <input
                type="number"
                min="0"
                placeholder="金額"
                prop:value=move || draft.with(|d| d.amount.clone())
                on:input=move |ev| draft.update(|d| d.amount = event_target_value(&ev))
            />
            <select on:change=move |ev| {
                let value = event_target_value(&ev);
                draft.update(|d| d.category = if value.is_empty() { None } else { Some(value) });
            }>
                <option value="" selected=move || draft.with(|d| d.category.is_none())>"カテゴリなし"</option>
                {move || categories().into_iter().map(|c| {
                    let current = c.clone();
                    view! {
                        <option
                            value=c.clone()
                            selected=move || draft.with(|d| d.category.as_deref() == Some(current.as_str()))
                        >
                            {c.clone()}
                        </option>
                    }
                }).collect_view()}
            </select>
            <input
                type="text"
                placeholder="メモ"
                prop:value=move || draft.with(|d| d.text.clone())
                on:input=move |ev| draft.update(|d| d.text = event_target_value(&ev))
            />
            <button type="submit">"追加"</button>
        </form>
    }
}
