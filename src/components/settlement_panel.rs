//! Settlement Panel Component
//!
//! Totals, the equal-split settlement and CSV export for the active project.

use leptos::prelude::*;
use ledger_core::services::{format_yen, CSV_MIME_TYPE};

use crate::commands::{alert, download_bytes};
use crate::context::use_warikan;

#[component]
pub fn SettlementPanel() -> impl IntoView {
    let ctx = use_warikan();
    let (show_settlement, set_show_settlement) = signal(false);
    let (export_payer, set_export_payer) = signal(String::new());

    let on_export = move |_: web_sys::MouseEvent| {
        let payer = export_payer.get_untracked();
        let payer = (!payer.is_empty()).then_some(payer);
        let export = ctx.with(|l| l.export_csv(payer.as_deref()));
        match export {
            Ok(file) => {
                if let Err(e) = download_bytes(&file.filename, &file.bytes, CSV_MIME_TYPE) {
                    alert(&e);
                }
            }
            Err(e) => alert(&e.to_string()),
        }
    };

    view! {
        <section class="summary">
            {move || {
                let totals = ctx.with(|l| l.totals());
                view! {
                    <div class="total-display">
                        <p class="overall-total">
                            <strong>{format!("全体の合計金額：{}", format_yen(totals.overall))}</strong>
                        </p>
                        <ul class="payer-totals">
                            {totals.by_payer.into_iter().map(|(payer, amount)| view! {
                                <li>{format!("{}の合計：{}", payer, format_yen(amount))}</li>
                            }).collect_view()}
                        </ul>
                    </div>
                }
            }}

            <button type="button" class="settle-btn" on:click=move |_| set_show_settlement.set(true)>"精算する"</button>

            <Show when=move || show_settlement.get()>
                <div class="settlement-results">
                    <h3>"精算結果"</h3>
                    <ul>
                        {move || ctx.with(|l| l.settlement()).lines.into_iter().map(|line| view! {
                            <li>{line.message()}</li>
                        }).collect_view()}
                    </ul>
                </div>
            </Show>

            <div class="export-bar">
                <select on:change=move |ev| set_export_payer.set(event_target_value(&ev))>
                    <option value="">"全員"</option>
                    {move || ctx.with(|l| l.payers()).into_iter().map(|p| {
                        let selected = p == export_payer.get_untracked();
                        view! { <option value=p.clone() selected=selected>{p.clone()}</option> }
                    }).collect_view()}
                </select>
                <button type="button" class="export-btn" on:click=on_export>"CSVエクスポート"</button>
            </div>
        </section>
    }
}
