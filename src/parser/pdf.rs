// file: src/parser/pdf.rs
// description: page-wise PDF text extraction
// reference: https://docs.rs/pdf-extract

use crate::error::{PipelineError, Result};
use std::path::Path;
use tracing::debug;

pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    /// Text of every page, in page order.
    pub async fn load_pages(&self, path: &Path) -> Result<Vec<String>> {
        let owned = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&owned))
            .await
            .map_err(|e| PipelineError::PdfLoad {
                file: path.display().to_string(),
                message: format!("Extraction task failed: {}", e),
            })?
            .map_err(|e| PipelineError::PdfLoad {
                file: path.display().to_string(),
                message: e.to_string(),
            })?;

        debug!("Loaded {} pages from {}", pages.len(), path.display());
        Ok(pages)
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}
