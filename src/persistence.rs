//! Persisted state saved between sessions.
//!
//! Each value lives under its own key in eframe's storage. Missing or
//! unreadable values fall back to their defaults.

use eframe::Storage;
use serde::de::DeserializeOwned;

use crate::document::Document;

pub const DOCUMENTS_KEY: &str = "markdown-documents";
pub const DARK_MODE_KEY: &str = "dark-mode";

fn load_or_default<T: DeserializeOwned + Default>(storage: Option<&dyn Storage>, key: &str) -> T {
    let Some(storage) = storage else {
        return T::default();
    };
    if storage.get_string(key).is_none() {
        return T::default();
    }
    eframe::get_value(storage, key).unwrap_or_else(|| {
        log::warn!("Ignoring unreadable persisted value for '{}'", key);
        T::default()
    })
}

pub fn load_documents(storage: Option<&dyn Storage>) -> Vec<Document> {
    load_or_default(storage, DOCUMENTS_KEY)
}

pub fn load_dark_mode(storage: Option<&dyn Storage>) -> bool {
    load_or_default(storage, DARK_MODE_KEY)
}

pub fn save_documents(storage: &mut dyn Storage, documents: &[Document]) {
    eframe::set_value(storage, DOCUMENTS_KEY, &documents);
}

pub fn save_dark_mode(storage: &mut dyn Storage, dark_mode: bool) {
    eframe::set_value(storage, DARK_MODE_KEY, &dark_mode);
}
