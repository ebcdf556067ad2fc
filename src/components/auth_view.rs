//! Auth View Component
//!
//! Google sign-in plus e-mail login / sign-up forms.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands::{self, alert};

#[component]
pub fn AuthView() -> impl IntoView {
    let (signing_up, set_signing_up) = signal(false);
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());

    let on_google = move |_: web_sys::MouseEvent| {
        tracing::info!("google login triggered");
        spawn_local(async move {
            if let Err(e) = commands::sign_in_with_google().await {
                alert(&e);
            }
        });
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let (email, password) = (email.get_untracked(), password.get_untracked());
        let sign_up = signing_up.get_untracked();
        tracing::info!(email = %email, sign_up, "email auth attempt");
        spawn_local(async move {
            let result = if sign_up {
                commands::sign_up_with_email(&email, &password).await
            } else {
                commands::sign_in_with_email(&email, &password).await
            };
            if let Err(e) = result {
                alert(&e);
            }
        });
    };

    view! {
        <div class="auth-container">
            <div class="auth-card">
                <h1>"Stock"</h1>
                <h2>{move || if signing_up.get() { "新規登録" } else { "ログイン" }}</h2>
                <button type="button" class="google-login-btn" on:click=on_google>"Googleでログイン"</button>
                <div class="divider">"または"</div>
                <form class="email-auth-form" on:submit=on_submit>
                    <input
                        type="email"
                        placeholder="メールアドレス"
                        required
                        prop:value=move || email.get()
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                    />
                    <input
                        type="password"
                        placeholder="パスワード"
                        required
                        prop:value=move || password.get()
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                    />
                    <button type="submit">{move || if signing_up.get() { "登録する" } else { "ログイン" }}</button>
                </form>
                <a
                    href="#"
                    class="auth-switch"
                    on:click=move |ev| {
                        ev.prevent_default();
                        set_signing_up.update(|s| *s = !*s);
                    }
                >
                    {move || if signing_up.get() { "アカウントをお持ちの方はこちら" } else { "新規登録はこちら" }}
                </a>
            </div>
        </div>
    }
}
