//! Cloud Document Store Bridge
//!
//! Bindings to the JS shim at `window.__STOCK__`, which wraps the hosted
//! document database and its auth provider. Documents cross the boundary as
//! plain JSON-compatible objects. The host page must define the shim before
//! the wasm module starts.
//!
//! Shim contract (paths are slash-separated, e.g. `users/{uid}/items/{id}`):
//!
//! | member | arguments | result |
//! |---|---|---|
//! | `getDoc` | `path` | `Promise<object \| null>`: the document data |
//! | `setDoc` | `path, data, merge` | `Promise<void>` |
//! | `addDoc` | `collection, data` | `Promise<string>`: the new document id |
//! | `deleteDoc` | `path` | `Promise<void>` |
//! | `watchCollection` | `collection, orderField \| undefined, descending, cb` | unsubscribe function; `cb([{ id, data }, ...])` on every snapshot |
//! | `watchDoc` | `path, cb` | unsubscribe function; `cb(data \| null)` on every snapshot |
//! | `onAuthChanged` | `cb` | unsubscribe function; `cb({ uid, email, displayName, photoURL } \| null)` |
//! | `signInWithGoogle` | | `Promise<void>` |
//! | `signInWithEmail` / `signUpWithEmail` | `email, password` | `Promise<void>` |
//! | `signOut` | | `Promise<void>` |
//!
//! Rejections should carry an `Error` (its `message` is shown to the user).

use async_trait::async_trait;
use ledger_core::domain::{DomainError, DomainResult};
use ledger_core::repository::{DocCallback, Document, DocumentStore, OrderBy, SnapshotCallback, Subscription};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["window", "__STOCK__"], js_name = getDoc, catch)]
    async fn js_get_doc(path: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["window", "__STOCK__"], js_name = setDoc, catch)]
    async fn js_set_doc(path: &str, data: JsValue, merge: bool) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["window", "__STOCK__"], js_name = addDoc, catch)]
    async fn js_add_doc(collection: &str, data: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["window", "__STOCK__"], js_name = deleteDoc, catch)]
    async fn js_delete_doc(path: &str) -> Result<JsValue, JsValue>;

    /// Returns the unsubscribe function
    #[wasm_bindgen(js_namespace = ["window", "__STOCK__"], js_name = watchCollection)]
    fn js_watch_collection(
        collection: &str,
        order_field: Option<String>,
        descending: bool,
        callback: &Closure<dyn Fn(JsValue)>,
    ) -> js_sys::Function;

    #[wasm_bindgen(js_namespace = ["window", "__STOCK__"], js_name = watchDoc)]
    fn js_watch_doc(path: &str, callback: &Closure<dyn Fn(JsValue)>) -> js_sys::Function;

    #[wasm_bindgen(js_namespace = ["window", "__STOCK__"], js_name = onAuthChanged)]
    fn js_on_auth_changed(callback: &Closure<dyn Fn(JsValue)>) -> js_sys::Function;

    #[wasm_bindgen(js_namespace = ["window", "__STOCK__"], js_name = signInWithGoogle, catch)]
    async fn js_sign_in_with_google() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["window", "__STOCK__"], js_name = signInWithEmail, catch)]
    async fn js_sign_in_with_email(email: &str, password: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["window", "__STOCK__"], js_name = signUpWithEmail, catch)]
    async fn js_sign_up_with_email(email: &str, password: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["window", "__STOCK__"], js_name = signOut, catch)]
    async fn js_sign_out() -> Result<JsValue, JsValue>;
}

/// Snapshot row as produced by the shim: `{ id, data }`
#[derive(Deserialize)]
struct RawDocument {
    id: String,
    data: Value,
}

/// Signed-in user as reported by the auth listener
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, alias = "photoURL")]
    pub photo_url: Option<String>,
}

impl AuthUser {
    /// Display name, else the local part of the e-mail address
    pub fn label(&self) -> String {
        match (&self.display_name, &self.email) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, Some(email)) => email.split('@').next().unwrap_or_default().to_string(),
            _ => self.uid.clone(),
        }
    }
}

fn js_error(e: JsValue) -> DomainError {
    let message = js_sys::Reflect::get(&e, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| e.as_string())
        .unwrap_or_else(|| format!("{:?}", e));
    DomainError::storage(message)
}

fn to_js(value: &Value) -> DomainResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| DomainError::Internal(e.to_string()))
}

fn from_js<T: for<'de> Deserialize<'de>>(value: JsValue) -> DomainResult<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| DomainError::Internal(e.to_string()))
}

/// Unsubscribes and frees the callback when the subscription ends
fn subscription(unsubscribe: js_sys::Function, callback: Closure<dyn Fn(JsValue)>) -> Subscription {
    Subscription::new(move || {
        let _ = unsubscribe.call0(&JsValue::NULL);
        drop(callback);
    })
}

/// [`DocumentStore`] over the browser shim
#[derive(Debug, Clone, Copy, Default)]
pub struct FirestoreBridge;

#[async_trait(?Send)]
impl DocumentStore for FirestoreBridge {
    async fn get_doc(&self, path: &str) -> DomainResult<Option<Value>> {
        let result = js_get_doc(path).await.map_err(js_error)?;
        if result.is_null() || result.is_undefined() {
            return Ok(None);
        }
        from_js(result).map(Some)
    }

    async fn set_doc(&self, path: &str, data: Value, merge: bool) -> DomainResult<()> {
        js_set_doc(path, to_js(&data)?, merge).await.map_err(js_error)?;
        Ok(())
    }

    async fn add_doc(&self, collection: &str, data: Value) -> DomainResult<String> {
        let id = js_add_doc(collection, to_js(&data)?).await.map_err(js_error)?;
        id.as_string()
            .ok_or_else(|| DomainError::Internal("addDoc returned no id".into()))
    }

    async fn delete_doc(&self, path: &str) -> DomainResult<()> {
        js_delete_doc(path).await.map_err(js_error)?;
        Ok(())
    }

    fn watch_collection(
        &self,
        collection: &str,
        order: Option<OrderBy>,
        on_snapshot: SnapshotCallback,
    ) -> Subscription {
        let path = collection.to_string();
        let callback = Closure::<dyn Fn(JsValue)>::new(move |snapshot: JsValue| {
            match serde_wasm_bindgen::from_value::<Vec<RawDocument>>(snapshot) {
                Ok(rows) => on_snapshot(
                    rows.into_iter()
                        .map(|r| Document { id: r.id, data: r.data })
                        .collect(),
                ),
                Err(e) => tracing::warn!(collection = %path, error = %e, "unreadable snapshot"),
            }
        });
        let (field, descending) = match order {
            Some(order) => (Some(order.field), order.descending),
            None => (None, false),
        };
        let unsubscribe = js_watch_collection(collection, field, descending, &callback);
        subscription(unsubscribe, callback)
    }

    fn watch_doc(&self, path: &str, on_snapshot: DocCallback) -> Subscription {
        let doc_path = path.to_string();
        let callback = Closure::<dyn Fn(JsValue)>::new(move |data: JsValue| {
            if data.is_null() || data.is_undefined() {
                on_snapshot(None);
                return;
            }
            match serde_wasm_bindgen::from_value::<Value>(data) {
                Ok(value) => on_snapshot(Some(value)),
                Err(e) => tracing::warn!(path = %doc_path, error = %e, "unreadable document"),
            }
        });
        let unsubscribe = js_watch_doc(path, &callback);
        subscription(unsubscribe, callback)
    }
}

// ========================
// Auth
// ========================

/// Listen for sign-in / sign-out; `None` means signed out
pub fn on_auth_changed(on_change: impl Fn(Option<AuthUser>) + 'static) -> Subscription {
    let callback = Closure::<dyn Fn(JsValue)>::new(move |user: JsValue| {
        if user.is_null() || user.is_undefined() {
            on_change(None);
            return;
        }
        match serde_wasm_bindgen::from_value::<AuthUser>(user) {
            Ok(user) => on_change(Some(user)),
            Err(e) => tracing::warn!(error = %e, "unreadable auth user"),
        }
    });
    let unsubscribe = js_on_auth_changed(&callback);
    subscription(unsubscribe, callback)
}

pub async fn sign_in_with_google() -> Result<(), String> {
    js_sign_in_with_google()
        .await
        .map(|_| ())
        .map_err(|e| format!("Googleログインに失敗しました: {}", js_error(e)))
}

pub async fn sign_in_with_email(email: &str, password: &str) -> Result<(), String> {
    js_sign_in_with_email(email, password)
        .await
        .map(|_| ())
        .map_err(|e| format!("ログインに失敗しました: {}", js_error(e)))
}

pub async fn sign_up_with_email(email: &str, password: &str) -> Result<(), String> {
    js_sign_up_with_email(email, password)
        .await
        .map(|_| ())
        .map_err(|e| format!("新規登録に失敗しました: {}", js_error(e)))
}

pub async fn sign_out() -> Result<(), String> {
    js_sign_out().await.map(|_| ()).map_err(|e| js_error(e).to_string())
}
