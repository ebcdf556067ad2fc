//! Category Chart Component
//!
//! Horizontal CSS bars of the per-category totals.

use leptos::prelude::*;
use ledger_core::services::format_yen;

use crate::context::use_warikan;

#[component]
pub fn CategoryChart() -> impl IntoView {
    let ctx = use_warikan();

    move || {
        let totals = ctx.with(|l| l.category_totals());
        let max = totals.iter().map(|(_, amount)| *amount).max().unwrap_or(0);
        if max == 0 {
            return None;
        }
        Some(view! {
            <section class="category-chart">
                <h3>"カテゴリ別"</h3>
                {totals.into_iter().map(|(category, amount)| {
                    let width = format!("width: {:.1}%", amount as f64 * 100.0 / max as f64);
                    view! {
                        <div class="chart-row">
                            <span class="chart-label">{category}</span>
                            <div class="chart-track">
                                <div class="chart-bar" style=width></div>
                            </div>
                            <span class="chart-value">{format_yen(amount)}</span>
                        </div>
                    }
                }).collect_view()}
            </section>
        })
    }
}
