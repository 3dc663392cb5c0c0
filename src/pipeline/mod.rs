// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod preprocessor;
mod progress;

pub use preprocessor::{DocumentFailure, PreprocessOutput, Preprocessor};
pub use progress::{PipelineStats, ProgressTracker};
