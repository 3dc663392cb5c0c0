// file: src/pipeline/preprocessor.rs
// description: turns a folder of papers into metadata-tagged sentence records
// reference: bounded-concurrency document processing with futures streams

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::extractor::{MetadataExtractor, PaperMetadata, SentenceBuilder};
use crate::llm::LanguageModel;
use crate::models::SentenceRecord;
use crate::parser::{MarkdownParser, PdfLoader, TextNormalizer};
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::prompts::PromptTemplate;
use crate::repository::{FileKind, FileScanner, ScannedFile};
use crate::utils::Validator;
use futures::stream::{self, StreamExt};
use std::path::Path;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct DocumentFailure {
    pub relative_path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct PreprocessOutput {
    pub records: Vec<SentenceRecord>,
    pub sources: Vec<String>,
    pub failures: Vec<DocumentFailure>,
    pub stats: PipelineStats,
}

pub struct Preprocessor<'a, M: LanguageModel> {
    config: PipelineConfig,
    extractor: MetadataExtractor<'a, M>,
    pdf_loader: PdfLoader,
    markdown_parser: MarkdownParser,
    normalizer: TextNormalizer,
    show_progress: bool,
    colored: bool,
}

impl<'a, M: LanguageModel> Preprocessor<'a, M> {
    pub fn new(config: PipelineConfig, model: &'a M, metadata_template: PromptTemplate) -> Self {
        let extractor =
            MetadataExtractor::new(model, metadata_template, config.metadata_window_chars);
        Self {
            config,
            extractor,
            pdf_loader: PdfLoader::new(),
            markdown_parser: MarkdownParser::new(),
            normalizer: TextNormalizer::new(),
            show_progress: false,
            colored: false,
        }
    }

    pub fn with_progress(mut self, colored: bool) -> Self {
        self.show_progress = true;
        self.colored = colored;
        self
    }

    pub async fn run(&self, root: &Path, limit: Option<usize>) -> Result<PreprocessOutput> {
        let scanner = FileScanner::new(self.config.clone());
        let report = scanner.scan(root)?;

        let mut files = report.ingestible(self.config.include_notes);
        if let Some(limit) = limit {
            files.truncate(limit);
        }

        info!("Preprocessing {} documents", files.len());

        let tracker = if self.show_progress {
            ProgressTracker::new(files.len(), self.colored)
        } else {
            ProgressTracker::hidden()
        };

        let parallel_workers = self.config.parallel_workers.max(1);
        let tracker_ref = &tracker;

        let results = stream::iter(files.into_iter().map(|file| async move {
            tracker_ref.set_message(file.relative_path.clone());
            let result = self.process_document(&file).await;
            match &result {
                Ok((pages, records)) => tracker_ref.record_document(*pages, records.len()),
                Err(_) => tracker_ref.record_failure(),
            }
            (file, result)
        }))
        .buffer_unordered(parallel_workers)
        .collect::<Vec<_>>()
        .await;

        tracker.finish();

        let mut output = PreprocessOutput::default();

        for (file, result) in results {
            match result {
                Ok((_, records)) => {
                    info!(
                        "Processed: {} ({} sentences)",
                        file.relative_path,
                        records.len()
                    );
                    output.sources.push(file.relative_path.clone());
                    output.records.extend(records);
                }
                Err(e) => {
                    error!("Failed to process {}: {}", file.relative_path, e);
                    output.failures.push(DocumentFailure {
                        relative_path: file.relative_path.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        output.sources.sort();
        output.records.sort_by(|a, b| {
            (&a.metadata.source, a.metadata.page, a.metadata.phrase_number).cmp(&(
                &b.metadata.source,
                b.metadata.page,
                b.metadata.phrase_number,
            ))
        });
        output.stats = tracker.get_stats();

        Ok(output)
    }

    /// Pages and sentence records of one document.
    pub async fn process_document(&self, file: &ScannedFile) -> Result<(usize, Vec<SentenceRecord>)> {
        let (pages, heading_title) = self.load_pages(file).await?;

        let first_page = pages
            .iter()
            .find(|page| !page.trim().is_empty())
            .ok_or_else(|| {
                PipelineError::Validation(format!("{} has no extractable text", file.relative_path))
            })?;

        // Notes rarely carry bibliographic data; their top heading stands in
        let metadata = match self.extractor.extract(&file.relative_path, first_page).await {
            Ok(metadata) => metadata,
            Err(PipelineError::Extraction(message)) if heading_title.is_some() => {
                warn!(
                    "No metadata for {} ({}), using its heading as title",
                    file.relative_path, message
                );
                PaperMetadata {
                    title: heading_title.unwrap_or_default(),
                    authors: Vec::new(),
                    year: String::new(),
                    citation: String::new(),
                }
            }
            Err(e) => return Err(e),
        };

        let records = SentenceBuilder::new(&metadata, &file.relative_path).build_pages(&pages);
        Ok((pages.len(), records))
    }

    /// Page texts, plus the top heading of markdown notes.
    async fn load_pages(&self, file: &ScannedFile) -> Result<(Vec<String>, Option<String>)> {
        let mut heading_title = None;
        let raw_pages = match file.kind {
            FileKind::Paper => self.pdf_loader.load_pages(&file.path).await?,
            FileKind::MarkdownNote => {
                let content = read_note(&file.path).await?;
                let parsed = self.markdown_parser.parse(&content)?;
                heading_title = parsed.title().map(str::to_string);
                vec![parsed.plain_text]
            }
            FileKind::TextNote => vec![read_note(&file.path).await?],
            FileKind::Other => {
                return Err(PipelineError::Validation(format!(
                    "Unsupported file: {}",
                    file.relative_path
                )));
            }
        };

        let pages = if self.config.normalize_text {
            raw_pages
                .iter()
                .map(|page| self.normalizer.normalize(page))
                .collect()
        } else {
            raw_pages
        };

        Ok((pages, heading_title))
    }
}

async fn read_note(path: &Path) -> Result<String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;
    Validator::validate_content_not_empty(&content)?;
    Ok(content)
}
