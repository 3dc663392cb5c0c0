// file: src/repository/mod.rs
// description: paper folder scanning module exports
// reference: Internal module structure

pub mod classifier;
pub mod scanner;

pub use classifier::{FileClassifier, FileKind};
pub use scanner::{FileScanner, ScanReport, ScannedFile};
