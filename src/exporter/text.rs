// file: src/exporter/text.rs
// description: plain-text dump of sentence records

use crate::error::{PipelineError, Result};
use crate::models::SentenceRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub struct TextExporter;

impl TextExporter {
    /// One block per record: `Sentence: ...`, `Metadata: ...`, blank line.
    pub fn save(records: &[SentenceRecord], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path).map_err(|source| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        for record in records {
            writeln!(writer, "Sentence: {}", record.sentence)?;
            writeln!(writer, "Metadata: {}", serde_json::to_string(&record.metadata)?)?;
            writeln!(writer)?;
        }
        writer.flush()?;

        info!("Saved {} sentences to {}", records.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentenceMetadata;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_save_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/output.txt");
        let records = vec![SentenceRecord::new(
            "Lakes existed.",
            SentenceMetadata {
                title: "Lakes".to_string(),
                authors: vec!["Doe, J.".to_string()],
                year: "2019".to_string(),
                citation: "Doe (2019)".to_string(),
                phrase_number: 1,
                page: 2,
                source: "lakes.pdf".to_string(),
            },
        )];

        TextExporter::save(&records, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "Sentence: Lakes existed.\nMetadata: {\"title\":\"Lakes\",\"authors\":[\"Doe, J.\"],\"year\":\"2019\",\"citation_format_x\":\"Doe (2019)\",\"phrase_number\":1,\"page\":2,\"source\":\"lakes.pdf\"}\n\n"
        );
    }
}
