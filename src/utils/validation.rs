// file: src/utils/validation.rs
// description: input checks for documents, queries and prompt categories

use crate::error::{PipelineError, Result};
use crate::repository::{FileClassifier, FileKind};
use std::path::Path;

pub struct Validator;

impl Validator {
    /// A readable paper or note no larger than `max_size_mb`.
    pub fn validate_document(path: &Path, max_size_mb: usize) -> Result<FileKind> {
        let metadata = path.metadata().map_err(|source| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

        if !metadata.is_file() {
            return Err(PipelineError::Validation(format!(
                "Path is not a file: {}",
                path.display()
            )));
        }

        let max_size = (max_size_mb as u64) * 1024 * 1024;
        if metadata.len() > max_size {
            return Err(PipelineError::Validation(format!(
                "{} is larger than {} MB",
                path.display(),
                max_size_mb
            )));
        }

        match FileClassifier::new().classify(path) {
            FileKind::Other => Err(PipelineError::Validation(format!(
                "Unsupported document type: {}",
                path.display()
            ))),
            kind => Ok(kind),
        }
    }

    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(PipelineError::Validation(format!(
                "Not a directory: {}",
                path.display()
            )));
        }
        Ok(())
    }

    pub fn validate_content_not_empty(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(PipelineError::Validation("Content is empty".to_string()));
        }
        Ok(())
    }

    pub fn validate_top_k(k: usize) -> Result<()> {
        if k == 0 {
            return Err(PipelineError::Validation(
                "k must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Category names are lowercase snake_case so they stay valid YAML keys.
    pub fn validate_category(name: &str) -> Result<()> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            && !name.starts_with(|c: char| c.is_ascii_digit());

        if !valid {
            return Err(PipelineError::Validation(format!(
                "Invalid prompt category '{}': use lowercase letters, digits and underscores",
                name
            )));
        }
        Ok(())
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_document() {
        let temp = TempDir::new().unwrap();
        let paper = temp.path().join("paper.pdf");
        fs::write(&paper, "test").unwrap();
        let image = temp.path().join("figure.png");
        fs::write(&image, "test").unwrap();

        assert_eq!(Validator::validate_document(&paper, 1).unwrap(), FileKind::Paper);
        assert!(Validator::validate_document(&image, 1).is_err());
        assert!(Validator::validate_document(temp.path(), 1).is_err());
        assert!(Validator::validate_document(Path::new("/nonexistent.pdf"), 1).is_err());
    }

    #[test]
    fn test_validate_document_size_limit() {
        let temp = TempDir::new().unwrap();
        let notes = temp.path().join("notes.txt");
        fs::write(&notes, vec![b'a'; 2 * 1024 * 1024]).unwrap();

        assert!(Validator::validate_document(&notes, 1).is_err());
        assert!(Validator::validate_document(&notes, 3).is_ok());
    }

    #[test]
    fn test_validate_directory() {
        let temp = TempDir::new().unwrap();
        assert!(Validator::validate_directory(temp.path()).is_ok());
        assert!(Validator::validate_directory(Path::new("/nonexistent")).is_err());
    }

    #[test]
    fn test_validate_content_and_top_k() {
        assert!(Validator::validate_content_not_empty("content").is_ok());
        assert!(Validator::validate_content_not_empty("   ").is_err());
        assert!(Validator::validate_top_k(5).is_ok());
        assert!(Validator::validate_top_k(0).is_err());
    }

    #[test]
    fn test_validate_category() {
        assert!(Validator::validate_category("document_metadata").is_ok());
        assert!(Validator::validate_category("topic2").is_ok());
        assert!(Validator::validate_category("").is_err());
        assert!(Validator::validate_category("Summary").is_err());
        assert!(Validator::validate_category("2nd").is_err());
        assert!(Validator::validate_category("my prompts").is_err());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(
            Validator::truncate_text("this is a very long text", 10),
            "this is a ..."
        );
        assert_eq!(Validator::truncate_text("Introducción", 11), "Introducció...");
    }
}
