// file: src/repository/scanner.rs
// description: Directory walking and file discovery with filtering
// reference: https://docs.rs/walkdir

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::repository::classifier::{FileClassifier, FileKind};
use crate::utils::Validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct FileScanner {
    config: PipelineConfig,
    classifier: FileClassifier,
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub relative_path: String,
    pub kind: FileKind,
    pub size: u64,
    pub modified: u64,
}

/// Files found under a root, split by kind.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub papers: Vec<ScannedFile>,
    pub notes: Vec<ScannedFile>,
    pub other: Vec<ScannedFile>,
}

impl ScanReport {
    /// Documents the pipeline ingests, papers first.
    pub fn ingestible(&self, include_notes: bool) -> Vec<ScannedFile> {
        let mut files = self.papers.clone();
        if include_notes {
            files.extend(self.notes.iter().cloned());
        }
        files
    }
}

impl FileScanner {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            classifier: FileClassifier::new(),
        }
    }

    pub fn scan(&self, root: &Path) -> Result<ScanReport> {
        Validator::validate_directory(root)?;
        info!("Scanning directory: {}", root.display());

        let mut report = ScanReport::default();
        let max_size = (self.config.max_file_size_mb * 1024 * 1024) as u64;

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();

            if self.should_skip(path) {
                debug!("Skipping file: {}", path.display());
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };

            let size = metadata.len();
            let kind = self.classifier.classify(path);

            if kind != FileKind::Other && size > max_size {
                debug!(
                    "Skipping large file ({} MB): {}",
                    size / 1024 / 1024,
                    path.display()
                );
                continue;
            }

            let modified = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or(0);

            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            let file = ScannedFile {
                path: path.to_path_buf(),
                relative_path,
                kind,
                size,
                modified,
            };

            match kind {
                FileKind::Paper => report.papers.push(file),
                FileKind::MarkdownNote | FileKind::TextNote => report.notes.push(file),
                FileKind::Other => report.other.push(file),
            }
        }

        info!(
            "Found {} papers, {} notes, {} other files",
            report.papers.len(),
            report.notes.len(),
            report.other.len()
        );
        Ok(report)
    }

    fn should_skip(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.config.skip_patterns {
            if let Some(suffix) = pattern.strip_prefix('*') {
                if path_str.ends_with(suffix) {
                    return true;
                }
            } else if let Some(prefix) = pattern.strip_suffix("/*") {
                if path
                    .components()
                    .any(|c| c.as_os_str().to_string_lossy() == prefix)
                {
                    return true;
                }
            } else if path_str.contains(pattern.as_str()) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(skip_patterns: Vec<String>) -> PipelineConfig {
        PipelineConfig {
            parallel_workers: 1,
            skip_patterns,
            max_file_size_mb: 10,
            metadata_window_chars: 1000,
            include_notes: true,
            normalize_text: true,
        }
    }

    #[test]
    fn test_scan_classifies_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested/paper.pdf"), "%PDF-1.4").unwrap();
        fs::write(temp.path().join("notes.md"), "# Notes").unwrap();
        fs::write(temp.path().join("image.png"), "png").unwrap();

        let scanner = FileScanner::new(config(vec![]));
        let report = scanner.scan(temp.path()).unwrap();

        assert_eq!(report.papers.len(), 1);
        assert_eq!(report.papers[0].relative_path, "nested/paper.pdf");
        assert_eq!(report.notes.len(), 1);
        assert_eq!(report.other.len(), 1);
        assert_eq!(report.ingestible(false).len(), 1);
        assert_eq!(report.ingestible(true).len(), 2);
    }

    #[test]
    fn test_scan_missing_directory() {
        let scanner = FileScanner::new(config(vec![]));
        assert!(scanner.scan(Path::new("/nonexistent/papers")).is_err());
    }

    #[test]
    fn test_skip_patterns() {
        let scanner = FileScanner::new(config(vec![
            "*.zip".to_string(),
            ".git/*".to_string(),
            "drafts".to_string(),
        ]));

        assert!(scanner.should_skip(Path::new("test.zip")));
        assert!(scanner.should_skip(Path::new("repo/.git/config")));
        assert!(scanner.should_skip(Path::new("drafts/paper.pdf")));
        assert!(!scanner.should_skip(Path::new("paper.pdf")));
    }
}
