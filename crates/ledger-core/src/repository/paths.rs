//! Document paths of the per-user hierarchy
//!
//! `users/{uid}` holds the profile (category set),
//! `users/{uid}/items/{itemId}` and `users/{uid}/history/{entryId}` the collections.

pub fn user_doc(uid: &str) -> String {
    format!("users/{}", uid)
}

pub fn items_collection(uid: &str) -> String {
    format!("users/{}/items", uid)
}

pub fn item_doc(uid: &str, item_id: &str) -> String {
    format!("users/{}/items/{}", uid, item_id)
}

pub fn history_collection(uid: &str) -> String {
    format!("users/{}/history", uid)
}
