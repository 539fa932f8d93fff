//! Imported documents and the current selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Extensions stripped from imported filenames to form the display name
pub const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// An imported markdown document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Strip a trailing `.md` / `.markdown` (any case) from a filename
pub fn display_name(filename: &str) -> &str {
    for ext in MARKDOWN_EXTENSIONS {
        let suffix_len = ext.len() + 1;
        if filename.len() > suffix_len && filename.is_char_boundary(filename.len() - suffix_len) {
            let (stem, suffix) = filename.split_at(filename.len() - suffix_len);
            if suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(ext) {
                return stem;
            }
        }
    }
    filename
}

/// Documents in newest-first order plus the selected one
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    selected_id: Option<String>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted documents. Later entries that repeat an
    /// earlier id are dropped. Nothing is selected.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let mut seen = HashSet::new();
        let total = documents.len();
        let documents: Vec<Document> = documents
            .into_iter()
            .filter(|doc| seen.insert(doc.id.clone()))
            .collect();
        if documents.len() != total {
            log::warn!(
                "Dropped {} persisted documents with duplicate ids",
                total - documents.len()
            );
        }
        Self {
            documents,
            selected_id: None,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// A document imported from `filename` with exactly this content
    pub fn find_copy(&self, filename: &str, content: &str) -> Option<&Document> {
        let name = display_name(filename);
        self.documents
            .iter()
            .find(|doc| doc.name == name && doc.content == content)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected(&self) -> Option<&Document> {
        self.selected_id.as_deref().and_then(|id| self.get(id))
    }

    /// Import a document at the front of the list and select it
    pub fn add_document(&mut self, filename: &str, content: impl Into<String>) -> &Document {
        let now = Utc::now();
        let document = Document {
            id: uuid::Uuid::new_v4().to_string(),
            name: display_name(filename).to_string(),
            content: content.into(),
            created_at: now,
            updated_at: now,
        };
        log::info!("Added document '{}' ({})", document.name, document.id);

        self.selected_id = Some(document.id.clone());
        self.documents.insert(0, document);
        &self.documents[0]
    }

    /// Remove a document, clearing the selection if it pointed at it
    pub fn delete_document(&mut self, id: &str) -> Option<Document> {
        let index = self.documents.iter().position(|doc| doc.id == id)?;
        let removed = self.documents.remove(index);
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        log::info!("Deleted document '{}' ({})", removed.name, removed.id);
        Some(removed)
    }

    /// Select a document by id. Unknown ids leave the selection untouched.
    pub fn select_document(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            log::debug!("Ignoring selection of unknown document {}", id);
            return false;
        }
        self.selected_id = Some(id.to_string());
        true
    }
}

/// Sidebar label for when a document was last changed
pub fn relative_date_label(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - timestamp).num_days().max(0);
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        _ => timestamp.format("%b %-d, %Y").to_string(),
    }
}

pub fn document_count_label(count: usize) -> String {
    if count == 1 {
        "1 document".to_string()
    } else {
        format!("{count} documents")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    #[test]
    fn test_add_strips_extension_and_selects() {
        let mut store = DocumentStore::new();
        let doc = store.add_document("notes.md", "# Hi").clone();

        assert_eq!(doc.name, "notes");
        assert_eq!(doc.content, "# Hi");
        assert_eq!(doc.created_at, doc.updated_at);
        assert_eq!(store.selected_id(), Some(doc.id.as_str()));
        assert_eq!(store.selected(), Some(&doc));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("guide.markdown"), "guide");
        assert_eq!(display_name("README.MD"), "README");
        assert_eq!(display_name("archive.md.bak"), "archive.md.bak");
        assert_eq!(display_name("my.mdfile.md"), "my.mdfile");
        assert_eq!(display_name(".md"), ".md");
        assert_eq!(display_name("plain"), "plain");
    }

    #[test]
    fn test_newest_first_and_unique_ids() {
        let mut store = DocumentStore::new();
        let first = store.add_document("a.md", "").id.clone();
        let second = store.add_document("a.md", "").id.clone();

        assert_ne!(first, second);
        let ids: Vec<_> = store.documents().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec![second.as_str(), first.as_str()]);
        assert_eq!(store.selected_id(), Some(second.as_str()));
    }

    #[test]
    fn test_find_copy_matches_name_and_content() {
        let mut store = DocumentStore::new();
        let id = store.add_document("notes.md", "# Notes").id.clone();
        store.add_document("other.md", "# Notes");

        assert_eq!(store.find_copy("notes.md", "# Notes").map(|d| d.id.as_str()), Some(id.as_str()));
        assert_eq!(store.find_copy("NOTES.md", "# Notes"), None);
        assert_eq!(store.find_copy("notes.markdown", "# Notes").map(|d| d.id.as_str()), Some(id.as_str()));
        assert_eq!(store.find_copy("notes.md", "# Changed"), None);
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut store = DocumentStore::new();
        let id = store.add_document("a.md", "").id.clone();

        assert!(store.delete_document(&id).is_some());
        assert_eq!(store.selected_id(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_other_keeps_selection() {
        let mut store = DocumentStore::new();
        let other = store.add_document("a.md", "").id.clone();
        let selected = store.add_document("b.md", "").id.clone();

        store.delete_document(&other);
        assert_eq!(store.selected_id(), Some(selected.as_str()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut store = DocumentStore::new();
        store.add_document("a.md", "");
        assert!(store.delete_document("nope").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_select_document() {
        let mut store = DocumentStore::new();
        let a = store.add_document("a.md", "").id.clone();
        let b = store.add_document("b.md", "").id.clone();

        assert!(store.select_document(&a));
        assert_eq!(store.selected_id(), Some(a.as_str()));
        assert!(!store.select_document("missing"));
        assert_eq!(store.selected_id(), Some(a.as_str()));
        assert!(store.select_document(&b));
        assert_eq!(store.selected().map(|d| d.name.as_str()), Some("b"));
    }

    #[test]
    fn test_from_documents_drops_duplicate_ids() {
        let mut source = DocumentStore::new();
        source.add_document("a.md", "first");
        let mut docs = source.documents().to_vec();
        let mut copy = docs[0].clone();
        copy.content = "second".to_string();
        docs.push(copy);

        let store = DocumentStore::from_documents(docs);
        assert_eq!(store.len(), 1);
        assert_eq!(store.documents()[0].content, "first");
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn test_relative_date_label() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        assert_eq!(relative_date_label(now, now), "Today");
        assert_eq!(relative_date_label(now - Duration::hours(30), now), "Yesterday");
        assert_eq!(relative_date_label(now - Duration::days(6), now), "6 days ago");
        assert_eq!(relative_date_label(now - Duration::days(15), now), "Mar 5, 2024");
        assert_eq!(relative_date_label(now + Duration::days(2), now), "Today");
    }

    #[test]
    fn test_document_count_label() {
        assert_eq!(document_count_label(0), "0 documents");
        assert_eq!(document_count_label(1), "1 document");
        assert_eq!(document_count_label(4), "4 documents");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Delete(usize),
        Select(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Add),
            (0usize..8).prop_map(Op::Delete),
            (0usize..8).prop_map(Op::Select),
        ]
    }

    proptest! {
        #[test]
        fn selection_never_dangles(ops in proptest::collection::vec(op_strategy(), 0..40)) {
            let mut store = DocumentStore::new();
            for op in ops {
                match op {
                    Op::Add => {
                        store.add_document("doc.md", "# Doc");
                    }
                    Op::Delete(i) => {
                        let Some(id) = store.documents().get(i).map(|d| d.id.clone()) else {
                            continue;
                        };
                        let before = store.selected_id().map(str::to_string);
                        store.delete_document(&id);
                        if before.as_deref() == Some(id.as_str()) {
                            prop_assert_eq!(store.selected_id(), None);
                        } else {
                            prop_assert_eq!(store.selected_id().map(str::to_string), before);
                        }
                    }
                    Op::Select(i) => {
                        if let Some(id) = store.documents().get(i).map(|d| d.id.clone()) {
                            store.select_document(&id);
                        }
                    }
                }
                if let Some(id) = store.selected_id() {
                    prop_assert!(store.get(id).is_some());
                }
                let ids: HashSet<_> = store.documents().iter().map(|d| d.id.as_str()).collect();
                prop_assert_eq!(ids.len(), store.len());
            }
        }
    }
}
