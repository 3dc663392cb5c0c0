// file: src/exporter/mod.rs
// description: sentence record exporters
// reference: internal module structure

pub mod json;
pub mod text;

pub use json::{ExportManifest, ExportedSentence, JsonExporter};
pub use text::TextExporter;
