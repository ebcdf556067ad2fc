//! History Table Component

use leptos::prelude::*;
use ledger_core::services::Slice;

use crate::context::use_stock;

#[component]
pub fn HistoryTable() -> impl IntoView {
    let ctx = use_stock();
    let rows = move || ctx.with(&[Slice::History], |s| s.recent_history());

    view! {
        <section class="history">
            <h2>"変更履歴"</h2>
            <table class="history-table">
                <thead>
                    <tr>
                        <th>"日時"</th>
                        <th>"アイテム"</th>
                        <th>"操作"</th>
                        <th>"変化"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        let rows = rows();
                        if rows.is_empty() {
                            return view! { <tr><td colspan="4" class="empty-state">"履歴はまだありません"</td></tr> }.into_any();
                        }
                        rows.into_iter().map(|entry| view! {
                            <tr>
                                <td class="history-date">{entry.date.clone()}</td>
                                <td>{entry.item_name.clone()}</td>
                                <td>
                                    <span class=format!("action-badge {}", entry.action.badge_class())>
                                        {entry.action.label()}
                                    </span>
                                </td>
                                <td class="history-change">{format!("{} → {}", entry.from, entry.to)}</td>
                            </tr>
                        }).collect_view().into_any()
                    }}
                </tbody>
            </table>
        </section>
    }
}
