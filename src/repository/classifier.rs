// file: src/repository/classifier.rs
// description: file classification by extension
// reference: extension-based document routing

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Paper,
    MarkdownNote,
    TextNote,
    Other,
}

pub struct FileClassifier;

impl FileClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, path: &Path) -> FileKind {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => FileKind::Paper,
            Some("md") | Some("markdown") => FileKind::MarkdownNote,
            Some("txt") => FileKind::TextNote,
            _ => FileKind::Other,
        }
    }
}

impl Default for FileClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        let classifier = FileClassifier::new();
        assert_eq!(classifier.classify(Path::new("a/paper.PDF")), FileKind::Paper);
        assert_eq!(classifier.classify(Path::new("notes.md")), FileKind::MarkdownNote);
        assert_eq!(classifier.classify(Path::new("notes.markdown")), FileKind::MarkdownNote);
        assert_eq!(classifier.classify(Path::new("raw.txt")), FileKind::TextNote);
        assert_eq!(classifier.classify(Path::new("image.png")), FileKind::Other);
        assert_eq!(classifier.classify(Path::new("Makefile")), FileKind::Other);
    }
}
