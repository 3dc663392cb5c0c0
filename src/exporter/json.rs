// file: src/exporter/json.rs
// description: json export of sentence records

use crate::error::{PipelineError, Result};
use crate::models::SentenceRecord;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::info;

pub struct JsonExporter;

#[derive(Debug, Serialize)]
pub struct ExportedSentence<'a> {
    pub id: String,
    #[serde(flatten)]
    pub record: &'a SentenceRecord,
}

#[derive(Debug, Serialize)]
pub struct ExportManifest {
    pub exported_at: String,
    pub total_sentences: usize,
    pub sources: Vec<String>,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    #[serde(flatten)]
    manifest: &'a ExportManifest,
    records: Vec<ExportedSentence<'a>>,
}

impl JsonExporter {
    /// Writes one JSON document holding the export manifest and every record.
    pub fn save(records: &[SentenceRecord], path: &Path, pretty: bool) -> Result<ExportManifest> {
        info!("Starting JSON export to {}", path.display());

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let sources: BTreeSet<&str> = records
            .iter()
            .map(|r| r.metadata.source.as_str())
            .collect();

        let manifest = ExportManifest {
            exported_at: Utc::now().to_rfc3339(),
            total_sentences: records.len(),
            sources: sources.into_iter().map(str::to_string).collect(),
        };

        let document = ExportDocument {
            manifest: &manifest,
            records: records
                .iter()
                .map(|record| ExportedSentence {
                    id: record.vector_id(),
                    record,
                })
                .collect(),
        };

        let json = if pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };

        fs::write(path, json).map_err(|source| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Export complete: {} sentences exported", manifest.total_sentences);
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentenceMetadata;
    use tempfile::tempdir;

    fn record(source: &str, sentence: &str) -> SentenceRecord {
        SentenceRecord::new(
            sentence,
            SentenceMetadata {
                title: "Lakes".to_string(),
                authors: vec!["Doe, J.".to_string()],
                year: "2019".to_string(),
                citation: "Doe (2019)".to_string(),
                phrase_number: 1,
                page: 1,
                source: source.to_string(),
            },
        )
    }

    #[test]
    fn test_save_writes_manifest_and_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/sentences.json");
        let records = vec![
            record("b.pdf", "One."),
            record("a.pdf", "Two."),
            record("a.pdf", "Three."),
        ];

        let manifest = JsonExporter::save(&records, &path, true).unwrap();
        assert_eq!(manifest.total_sentences, 3);
        assert_eq!(manifest.sources, vec!["a.pdf", "b.pdf"]);

        let written = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["total_sentences"], 3);
        assert!(parsed["exported_at"].is_string());
        assert_eq!(parsed["records"][0]["sentence"], "One.");
        assert_eq!(parsed["records"][0]["metadata"]["citation_format_x"], "Doe (2019)");
        assert_eq!(parsed["records"][0]["id"], records[0].vector_id());
    }

    #[test]
    fn test_compact_output_is_single_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("compact.json");
        JsonExporter::save(&[record("a.pdf", "One.")], &path, false).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains('\n'));
    }
}
