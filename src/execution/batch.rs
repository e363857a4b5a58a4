//! Runs one pipeline over many images, in parallel with rayon.
//!
//! An image that fails (unreadable file, control image of the wrong size) is
//! recorded in the [`BatchReport`] and the rest of the batch continues. A
//! fatal error, such as a corner control with no center marker, stops the run:
//! every remaining image would hit the same control and fail the same way.

use crate::core::codec;
use crate::core::config::PipelineConfig;
use crate::core::error::{BatchError, BleedError, BleedResult, ConfigError, ConfigResult};
use crate::execution::pipeline::{ControlCache, Pipeline, PipelineStats};
use crate::execution::progress::ProgressTracker;
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;

/// One image to read, transform and write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl BatchJob {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
        }
    }

    /// Jobs listed in a configuration, with output paths resolved.
    pub fn from_config(config: &PipelineConfig) -> ConfigResult<Vec<BatchJob>> {
        if config.jobs.is_empty() {
            return Err(ConfigError::NoJobs);
        }
        config
            .jobs
            .iter()
            .enumerate()
            .map(|(index, job)| Ok(BatchJob::new(job.source.clone(), config.output_path(index)?)))
            .collect()
    }
}

/// Outcome of a batch that ran to the end.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output paths written, in job order.
    pub succeeded: Vec<PathBuf>,
    /// Source paths that failed, with the reason.
    pub failed: Vec<(PathBuf, BleedError)>,
    pub duration_ms: u64,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Turn a partial success into an error.
    pub fn into_result(self) -> Result<Self, BatchError> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(BatchError::Incomplete {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}

enum JobOutcome {
    Written(PathBuf),
    Failed(PathBuf, BleedError),
    Skipped,
}

/// Applies a pipeline to every job of a batch.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    pipeline: Pipeline,
    parallel: bool,
}

impl BatchRunner {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            parallel: true,
        }
    }

    /// Build the pipeline a configuration describes.
    pub fn from_config(config: &PipelineConfig) -> BleedResult<Self> {
        let mut cache = ControlCache::new();
        let pipeline = Pipeline::from_config(&config.stages, &mut cache)?;
        Ok(Self::new(pipeline).with_parallel(config.parallel))
    }

    /// Process images one at a time when `parallel` is false.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Read, transform and write a single job.
    pub fn process(&self, job: &BatchJob) -> BleedResult<PipelineStats> {
        let source = codec::load(&job.source)?;
        let (output, stats) = self.pipeline.run_with_stats(source)?;
        codec::save(&output, &job.output)?;
        log::debug!(
            "{} -> {} ({}x{} -> {}x{})",
            job.source.display(),
            job.output.display(),
            stats.input_size.0,
            stats.input_size.1,
            stats.output_size.0,
            stats.output_size.1
        );
        Ok(stats)
    }

    /// Run every job without progress reporting.
    pub fn run(&self, jobs: &[BatchJob]) -> Result<BatchReport, BatchError> {
        self.run_with_progress(jobs, &ProgressTracker::new(jobs.len()))
    }

    /// Run every job, reporting each image to `tracker`.
    pub fn run_with_progress(
        &self,
        jobs: &[BatchJob],
        tracker: &ProgressTracker,
    ) -> Result<BatchReport, BatchError> {
        log::info!(
            "Processing {} images through {} stages{}",
            jobs.len(),
            self.pipeline.len(),
            if self.parallel { " in parallel" } else { "" }
        );
        tracker.start();

        let process = |job: &BatchJob| -> Result<JobOutcome, BatchError> {
            if tracker.is_cancelled() {
                return Ok(JobOutcome::Skipped);
            }
            let start = Instant::now();
            match self.process(job) {
                Ok(_) => {
                    tracker.image_completed(job.output.clone(), start.elapsed().as_millis() as u64);
                    Ok(JobOutcome::Written(job.output.clone()))
                }
                Err(error) if error.is_fatal() => {
                    log::error!("{}: {}", job.source.display(), error);
                    tracker.cancel();
                    Err(BatchError::ItemFailed {
                        path: job.source.clone(),
                        error,
                    })
                }
                Err(error) => {
                    log::warn!("Skipping {}: {}", job.source.display(), error);
                    tracker.image_failed(job.source.clone(), error.to_string());
                    Ok(JobOutcome::Failed(job.source.clone(), error))
                }
            }
        };

        let outcomes: Vec<JobOutcome> = if self.parallel {
            jobs.par_iter().map(process).collect::<Result<_, _>>()?
        } else {
            jobs.iter().map(process).collect::<Result<_, _>>()?
        };

        let mut report = BatchReport::default();
        for outcome in outcomes {
            match outcome {
                JobOutcome::Written(path) => report.succeeded.push(path),
                JobOutcome::Failed(path, error) => report.failed.push((path, error)),
                JobOutcome::Skipped => {}
            }
        }
        report.duration_ms = tracker.elapsed_ms();
        tracker.complete();

        log::info!(
            "Batch finished: {} written, {} failed in {}ms",
            report.succeeded.len(),
            report.failed.len(),
            report.duration_ms
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Color, RasterBuffer};
    use crate::execution::progress::ProgressUpdate;
    use crate::transforms::corners::Marker;
    use crate::transforms::stages::{ExtendCorners, MirrorBleed};
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    fn write_sources(dir: &Path, count: usize) -> Vec<BatchJob> {
        (0..count)
            .map(|i| {
                let source = dir.join(format!("card{}.png", i));
                codec::save(&RasterBuffer::filled(2, 2, Color::RED), &source).unwrap();
                BatchJob::new(source, dir.join("out").join(format!("card{}.png", i)))
            })
            .collect()
    }

    #[test]
    fn test_processes_every_job() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = write_sources(dir.path(), 3);
        let runner = BatchRunner::new(Pipeline::new().with_stage(MirrorBleed::new(1)));

        let report = runner.run(&jobs).unwrap().into_result().unwrap();
        assert_eq!(report.succeeded.len(), 3);
        for job in &jobs {
            let out = codec::load(&job.output).unwrap();
            assert_eq!(out.dimensions(), (4, 4));
        }
    }

    #[test]
    fn test_failed_image_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut jobs = write_sources(dir.path(), 2);
        jobs.push(BatchJob::new(dir.path().join("missing.png"), dir.path().join("x.png")));
        let runner = BatchRunner::new(Pipeline::new().with_stage(MirrorBleed::new(1)));

        let report = runner.run(&jobs).unwrap();
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, dir.path().join("missing.png"));
        assert!(matches!(
            report.into_result(),
            Err(BatchError::Incomplete { failed: 1, total: 3 })
        ));
    }

    #[test]
    fn test_missing_center_stops_batch() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = write_sources(dir.path(), 3);
        let mut control = RasterBuffer::new(2, 2);
        control.set_pixel(0, 0, Marker::TARGET);
        let runner = BatchRunner::new(
            Pipeline::new().with_stage(ExtendCorners::new(Arc::new(control))),
        )
        .with_parallel(false);

        let updates = Arc::new(Mutex::new(Vec::new()));
        let updates_clone = updates.clone();
        let tracker = ProgressTracker::new(jobs.len()).with_callback(Box::new(move |update: ProgressUpdate| {
            updates_clone.lock().unwrap().push(update);
        }));

        let err = runner.run_with_progress(&jobs, &tracker).unwrap_err();
        match err {
            BatchError::ItemFailed { path, error } => {
                assert_eq!(path, jobs[0].source);
                assert!(error.is_fatal());
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!jobs[1].output.exists());
        assert!(updates.lock().unwrap().contains(&ProgressUpdate::Cancelled));
    }

    #[test]
    fn test_from_config() {
        let dir = tempfile::tempdir().unwrap();
        write_sources(dir.path(), 2);
        let config_path = dir.path().join("bleed.toml");
        std::fs::write(
            &config_path,
            r##"
output_dir = "bled"
parallel = false

[[jobs]]
source = "card0.png"

[[jobs]]
source = "card1.png"
output = "named.jpg"

[[stages]]
kind = "solid_bleed"
padding = 3
color = "#FFFFFF"
"##,
        )
        .unwrap();

        let config = PipelineConfig::load(&config_path).unwrap();
        let runner = BatchRunner::from_config(&config).unwrap();
        let jobs = BatchJob::from_config(&config).unwrap();
        assert_eq!(runner.pipeline().stage_ids(), vec!["solid_bleed"]);
        assert_eq!(jobs[0].output, dir.path().join("bled/card0.png"));

        let report = runner.run(&jobs).unwrap();
        assert!(report.is_success());
        let out = codec::load(dir.path().join("bled/card0.png")).unwrap();
        assert_eq!(out.dimensions(), (8, 8));
        assert_eq!(out.get_pixel(0, 0), Color::WHITE);
        assert!(dir.path().join("named.jpg").exists());
    }

    #[test]
    fn test_config_without_jobs() {
        let config =
            PipelineConfig::from_toml_str("[[stages]]\nkind = \"mirror_bleed\"\npadding = 1\n")
                .unwrap();
        assert!(matches!(
            BatchJob::from_config(&config),
            Err(ConfigError::NoJobs)
        ));
    }
}
