//! Project Bar Component
//!
//! Create, switch and delete Warikan projects.

use leptos::prelude::*;

use crate::commands::confirm;
use crate::context::use_warikan;

#[component]
pub fn ProjectBar() -> impl IntoView {
    let ctx = use_warikan();
    let (new_name, set_new_name) = signal(String::new());

    let on_create = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get_untracked();
        if name.trim().is_empty() {
            return;
        }
        ctx.mutate(|l| l.create_project(&name));
        set_new_name.set(String::new());
    };

    let on_select = move |ev: web_sys::Event| {
        let name = event_target_value(&ev);
        ctx.mutate(|l| l.select_project(&name));
    };

    let on_delete = move |_: web_sys::MouseEvent| {
        let name = ctx.with(|l| l.current_project().to_string());
        if confirm(&format!("「{}」を削除してもよろしいですか？", name)) {
            ctx.mutate(|l| l.delete_project(&name));
        }
    };

    view! {
        <section class="project-bar">
            <form class="project-create" on:submit=on_create>
                <input
                    type="text"
                    placeholder="案件名"
                    prop:value=move || new_name.get()
                    on:input=move |ev| set_new_name.set(event_target_value(&ev))
                />
                <button type="submit">"案件を作成"</button>
            </form>
            <div class="project-select">
                <select on:change=on_select>
                    {move || {
                        let (projects, current) = ctx.with(|l| (l.projects(), l.current_project().to_string()));
                        let mut options = projects;
                        if !options.contains(&current) {
                            options.insert(0, current.clone());
                        }
                        options.into_iter().map(|p| {
                            let selected = p == current;
                            view! { <option value=p.clone() selected=selected>{p.clone()}</option> }
                        }).collect_view()
                    }}
                </select>
                <button type="button" class="delete-project-btn" on:click=on_delete>"案件を削除"</button>
            </div>
        </section>
    }
}
