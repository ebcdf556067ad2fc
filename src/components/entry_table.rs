//! Entry Table Component
//!
//! The active project's entries with delete and edit. Editing takes the
//! entry out of the list and puts it back into the form.

use leptos::prelude::*;
use ledger_core::domain::EntryDraft;

use crate::context::use_warikan;

#[component]
pub fn EntryTable() -> impl IntoView {
    let ctx = use_warikan();

    let on_edit = move |index: usize| {
        if let Some(entry) = ctx.mutate(|l| l.take_entry(index)) {
            ctx.draft.set(EntryDraft::from(&entry));
        }
    };
    let on_remove = move |index: usize| {
        ctx.mutate(|l| l.remove_entry(index));
    };

    view! {
        <table class="entry-table">
            <thead>
                <tr>
                    <th>"日付"</th>
                    <th>"支払い者"</th>
                    <th>"カテゴリ"</th>
                    <th>"金額"</th>
                    <th>"メモ"</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>
                {move || {
                    let entries = ctx.with(|l| l.entries().to_vec());
                    if entries.is_empty() {
                        return view! { <tr><td colspan="6" class="empty-state">"まだ記録がありません"</td></tr> }.into_any();
                    }
                    entries.into_iter().enumerate().map(|(index, entry)| view! {
                        <tr>
                            <td>{entry.date}</td>
                            <td>{entry.payer}</td>
                            <td>{entry.category.unwrap_or_default()}</td>
                            <td class="amount">{format!("{}円", entry.amount)}</td>
                            <td>{entry.text}</td>
                            <td class="actions">
                                <button type="button" on:click=move |_| on_remove(index)>"削除"</button>
                                <button type="button" on:click=move |_| on_edit(index)>"編集"</button>
                            </td>
                        </tr>
                    }).collect_view().into_any()
                }}
            </tbody>
        </table>
    }
}
