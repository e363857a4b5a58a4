//! Ordered chain of stages applied to one image.

use crate::core::codec;
use crate::core::config::StageConfig;
use crate::core::error::BleedResult;
use crate::core::stage::RasterStage;
use crate::core::types::RasterBuffer;
use crate::transforms::stages::{ExtendCorners, ExtendSides, MirrorBleed, SolidBleed};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Statistics from one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineStats {
    pub stages_run: usize,
    pub input_size: (u32, u32),
    pub output_size: (u32, u32),
    pub duration_ms: u64,
}

/// Loads each control image once and hands out shared copies.
#[derive(Debug, Default)]
pub struct ControlCache {
    controls: HashMap<PathBuf, Arc<RasterBuffer>>,
}

impl ControlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, or return the copy loaded earlier.
    pub fn get_or_load(&mut self, path: &Path) -> BleedResult<Arc<RasterBuffer>> {
        if let Some(control) = self.controls.get(path) {
            return Ok(Arc::clone(control));
        }
        let control = Arc::new(codec::load(path)?);
        log::debug!(
            "Loaded control image {} ({}x{})",
            path.display(),
            control.width(),
            control.height()
        );
        self.controls.insert(path.to_path_buf(), Arc::clone(&control));
        Ok(control)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

/// Stages applied in order, each to the previous stage's output.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn RasterStage>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from configuration, loading control images through `cache`.
    pub fn from_config(stages: &[StageConfig], cache: &mut ControlCache) -> BleedResult<Self> {
        let mut pipeline = Self::new();
        for config in stages {
            let stage: Box<dyn RasterStage> = match config {
                StageConfig::ExtendSides { control } => {
                    Box::new(ExtendSides::new(cache.get_or_load(control)?))
                }
                StageConfig::ExtendCorners { control } => {
                    Box::new(ExtendCorners::new(cache.get_or_load(control)?))
                }
                StageConfig::MirrorBleed { padding } => Box::new(MirrorBleed::new(*padding)),
                StageConfig::SolidBleed { padding, color } => {
                    Box::new(SolidBleed::new(*padding, *color))
                }
            };
            pipeline.push(stage);
        }
        Ok(pipeline)
    }

    /// Append a stage.
    pub fn push(&mut self, stage: Box<dyn RasterStage>) {
        self.stages.push(stage);
    }

    /// Append a stage, builder style.
    pub fn with_stage(mut self, stage: impl RasterStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// IDs of the stages, in application order.
    pub fn stage_ids(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.metadata().id).collect()
    }

    /// Check every stage against the dimensions it will actually receive.
    pub fn validate(&self, width: u32, height: u32) -> BleedResult<()> {
        let mut size = (width, height);
        for stage in &self.stages {
            stage
                .validate(size.0, size.1)
                .map_err(|e| e.in_stage(stage.metadata().id))?;
            size = stage.output_size(size.0, size.1);
        }
        Ok(())
    }

    /// Output dimensions for a `width` x `height` source.
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        self.stages
            .iter()
            .fold((width, height), |(w, h), stage| stage.output_size(w, h))
    }

    /// Run every stage over `source`.
    pub fn run(&self, source: RasterBuffer) -> BleedResult<RasterBuffer> {
        self.run_with_stats(source).map(|(buffer, _)| buffer)
    }

    /// Run every stage over `source` and report what happened.
    pub fn run_with_stats(&self, source: RasterBuffer) -> BleedResult<(RasterBuffer, PipelineStats)> {
        let start = Instant::now();
        let input_size = source.dimensions();
        self.validate(input_size.0, input_size.1)?;

        let mut buffer = source;
        for (index, stage) in self.stages.iter().enumerate() {
            let id = stage.metadata().id;
            log::debug!("Stage {}/{}: {}", index + 1, self.stages.len(), id);
            buffer = stage.apply(buffer).map_err(|e| e.in_stage(&id))?;
        }

        let stats = PipelineStats {
            stages_run: self.stages.len(),
            input_size,
            output_size: buffer.dimensions(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        Ok((buffer, stats))
    }
}
