//! Local-first markdown reader.
//!
//! Imported documents are kept in eframe's storage. The selected document is
//! rendered with `egui_commonmark`, and its headings feed a two-tier table of
//! contents that scrolls the content area.

pub mod app;
pub mod document;
pub mod headings;
pub mod ingest;
pub mod navigator;
pub mod outline;
pub mod persistence;
pub mod scroll;
pub mod viewport;

pub use app::ReaderApp;
