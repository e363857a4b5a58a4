//! Execution module.
//!
//! Runs stage pipelines over single images and over batches of files.

pub mod batch;
pub mod pipeline;
pub mod progress;

pub use batch::{BatchJob, BatchReport, BatchRunner};
pub use pipeline::{ControlCache, Pipeline, PipelineStats};
pub use progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
