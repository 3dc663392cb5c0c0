// file: src/pipeline/progress.rs
// description: progress tracking and statistics for a preprocessing run
// reference: uses indicatif for progress bars and tracks processing metrics

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub pages_processed: usize,
    pub sentences_created: usize,
    pub duration_secs: f64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sentences_per_document(&self) -> f64 {
        if self.documents_processed == 0 {
            return 0.0;
        }
        self.sentences_created as f64 / self.documents_processed as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.documents_processed + self.documents_failed;
        if total == 0 {
            return 0.0;
        }
        (self.documents_processed as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    documents_processed: AtomicUsize,
    documents_failed: AtomicUsize,
    pages_processed: AtomicUsize,
    sentences_created: AtomicUsize,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_documents: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();
        let main_bar = create_progress_bar(&multi_progress, total_documents as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);
        Self::from_bars(main_bar, detail_bar)
    }

    /// Tracker that counts without drawing anything.
    pub fn hidden() -> Self {
        Self::from_bars(ProgressBar::hidden(), ProgressBar::hidden())
    }

    fn from_bars(main_bar: ProgressBar, detail_bar: ProgressBar) -> Self {
        Self {
            main_bar,
            detail_bar,
            documents_processed: AtomicUsize::new(0),
            documents_failed: AtomicUsize::new(0),
            pages_processed: AtomicUsize::new(0),
            sentences_created: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_document(&self, pages: usize, sentences: usize) {
        self.documents_processed.fetch_add(1, Ordering::SeqCst);
        self.pages_processed.fetch_add(pages, Ordering::SeqCst);
        self.sentences_created.fetch_add(sentences, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn record_failure(&self) {
        self.documents_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.main_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Preprocessing complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            documents_processed: self.documents_processed.load(Ordering::SeqCst),
            documents_failed: self.documents_failed.load(Ordering::SeqCst),
            pages_processed: self.pages_processed.load(Ordering::SeqCst),
            sentences_created: self.sentences_created.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs_f64(),
        }
    }

    fn update_detail_bar(&self) {
        let sentences = self.sentences_created.load(Ordering::SeqCst);
        let failed = self.documents_failed.load(Ordering::SeqCst);
        self.detail_bar
            .set_message(format!("Sentences: {} | Failed: {}", sentences, failed));
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let (template, chars) = if colored {
        (
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            "█▓▒░",
        )
    } else {
        (
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}",
            "=>-",
        )
    };

    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        bar.set_style(style.progress_chars(chars));
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    if let Ok(style) = ProgressStyle::default_bar().template("{msg}") {
        bar.set_style(style);
    }
    bar
}
