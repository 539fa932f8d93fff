//! Reading markdown files handed over by the file dialog, drag and drop or
//! the command line.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::document::MARKDOWN_EXTENSIONS;

/// Errors that can occur while importing a file
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file is not a markdown file
    #[error("Please import a valid Markdown (.md or .markdown) file")]
    UnsupportedExtension { name: String },

    /// The file could not be read
    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A dropped file carried neither a path nor its bytes
    #[error("no content available for dropped file {name}")]
    NoContent { name: String },
}

impl IngestError {
    /// Whether the user should be told about this error. Read failures are
    /// only logged and the import is dropped.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, IngestError::UnsupportedExtension { .. })
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// A decoded file ready to be added to the document store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFile {
    pub filename: String,
    pub content: String,
}

/// Check if a filename has a markdown extension
pub fn is_markdown_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            MARKDOWN_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Validate and decode raw bytes. Invalid UTF-8 is replaced rather than rejected.
pub fn import_bytes(filename: &str, bytes: &[u8]) -> Result<ImportedFile> {
    if !is_markdown_file(filename) {
        return Err(IngestError::UnsupportedExtension {
            name: filename.to_string(),
        });
    }

    let content = String::from_utf8_lossy(bytes);
    if content.contains('\u{FFFD}') {
        log::warn!("File {} contains invalid UTF-8", filename);
    }

    Ok(ImportedFile {
        filename: filename.to_string(),
        content: content.into_owned(),
    })
}

/// Validate and read a file from disk
pub fn import_path(path: &Path) -> Result<ImportedFile> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if !is_markdown_file(&filename) {
        return Err(IngestError::UnsupportedExtension { name: filename });
    }

    let bytes = fs::read(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    import_bytes(&filename, &bytes)
}

/// Import a file dropped onto the window, from its path or its in-memory bytes
pub fn import_dropped(file: &egui::DroppedFile) -> Result<ImportedFile> {
    if let Some(path) = &file.path {
        return import_path(path);
    }
    match &file.bytes {
        Some(bytes) => import_bytes(&file.name, bytes),
        None => Err(IngestError::NoContent {
            name: file.name.clone(),
        }),
    }
}
