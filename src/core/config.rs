//! Pipeline configuration loaded from TOML.
//!
//! ```toml
//! output_dir = "out"
//!
//! [[jobs]]
//! source = "card.png"
//!
//! [[stages]]
//! kind = "extend_sides"
//! control = "sides.png"
//!
//! [[stages]]
//! kind = "mirror_bleed"
//! padding = 36
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use crate::core::error::{ConfigError, ConfigResult};
use crate::core::types::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A whole batch run: which images to process and which stages to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory for outputs of jobs that do not name their own output.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Process images on all cores.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
    pub stages: Vec<StageConfig>,
}

/// One image to process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub source: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// One transform in the chain, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageConfig {
    ExtendSides {
        control: PathBuf,
    },
    ExtendCorners {
        control: PathBuf,
    },
    MirrorBleed {
        padding: u32,
    },
    SolidBleed {
        padding: u32,
        #[serde(default)]
        color: Color,
    },
}

fn default_parallel() -> bool {
    true
}

impl StageConfig {
    /// Identifier of the stage this entry builds.
    pub fn kind(&self) -> &'static str {
        match self {
            StageConfig::ExtendSides { .. } => "extend_sides",
            StageConfig::ExtendCorners { .. } => "extend_corners",
            StageConfig::MirrorBleed { .. } => "mirror_bleed",
            StageConfig::SolidBleed { .. } => "solid_bleed",
        }
    }

    /// Control image path, for stages that use one.
    pub fn control(&self) -> Option<&Path> {
        match self {
            StageConfig::ExtendSides { control } | StageConfig::ExtendCorners { control } => {
                Some(control)
            }
            _ => None,
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        if let StageConfig::ExtendSides { control } | StageConfig::ExtendCorners { control } = self
        {
            *control = resolve(base, control);
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from TOML text. Paths are kept as written.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file and resolve relative paths against its directory.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            error,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);
        log::debug!(
            "Loaded {} with {} jobs and {} stages",
            path.display(),
            config.jobs.len(),
            config.stages.len()
        );
        Ok(config)
    }

    /// Check structural requirements that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.stages.is_empty() {
            return Err(ConfigError::NoStages);
        }
        for (index, job) in self.jobs.iter().enumerate() {
            if job.output.is_none() && self.output_dir.is_none() {
                return Err(ConfigError::MissingOutput { index });
            }
        }
        Ok(())
    }

    /// Where the job at `index` writes its result.
    pub fn output_path(&self, index: usize) -> ConfigResult<PathBuf> {
        let job = self.jobs.get(index).ok_or(ConfigError::MissingOutput { index })?;
        if let Some(output) = &job.output {
            return Ok(output.clone());
        }
        match (&self.output_dir, job.source.file_name()) {
            (Some(dir), Some(name)) => Ok(dir.join(name)),
            _ => Err(ConfigError::MissingOutput { index }),
        }
    }

    /// Rebase every relative path onto `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        self.output_dir = self.output_dir.take().map(|dir| resolve(base, &dir));
        for job in &mut self.jobs {
            job.source = resolve(base, &job.source);
            job.output = job.output.take().map(|output| resolve(base, &output));
        }
        for stage in &mut self.stages {
            stage.resolve_paths(base);
        }
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
output_dir = "out"

[[jobs]]
source = "cards/front.png"

[[jobs]]
source = "cards/back.png"
output = "special/back.jpg"

[[stages]]
kind = "extend_sides"
control = "controls/sides.png"

[[stages]]
kind = "extend_corners"
control = "controls/corners.png"

[[stages]]
kind = "solid_bleed"
padding = 12
color = "#102030"

[[stages]]
kind = "mirror_bleed"
padding = 36
"##;

    #[test]
    fn test_parse_sample() {
        let config = PipelineConfig::from_toml_str(SAMPLE).unwrap();
        assert!(config.parallel);
        assert_eq!(config.jobs.len(), 2);
        let kinds: Vec<_> = config.stages.iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec!["extend_sides", "extend_corners", "solid_bleed", "mirror_bleed"]
        );
        assert_eq!(
            config.stages[2],
            StageConfig::SolidBleed {
                padding: 12,
                color: Color::rgb(0x10, 0x20, 0x30)
            }
        );
        assert_eq!(config.stages[0].control(), Some(Path::new("controls/sides.png")));
        assert_eq!(config.stages[3].control(), None);
    }

    #[test]
    fn test_output_paths() {
        let config = PipelineConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.output_path(0).unwrap(), PathBuf::from("out/front.png"));
        assert_eq!(config.output_path(1).unwrap(), PathBuf::from("special/back.jpg"));
        assert!(config.output_path(2).is_err());
    }

    #[test]
    fn test_solid_color_defaults_to_black() {
        let config = PipelineConfig::from_toml_str(
            "[[stages]]\nkind = \"solid_bleed\"\npadding = 3\n",
        )
        .unwrap();
        assert_eq!(
            config.stages[0],
            StageConfig::SolidBleed {
                padding: 3,
                color: Color::BLACK
            }
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            PipelineConfig::from_toml_str("stages = []"),
            Err(ConfigError::NoStages)
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("[[stages]]\nkind = \"sharpen\"\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str(
                "[[stages]]\nkind = \"solid_bleed\"\npadding = 1\ncolor = \"#12\"\n"
            ),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str(
                "[[stages]]\nkind = \"solid_bleed\"\npadding = 1\ncolor = \"aéb\"\n"
            ),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str(
                "[[jobs]]\nsource = \"a.png\"\n[[stages]]\nkind = \"mirror_bleed\"\npadding = 1\n"
            ),
            Err(ConfigError::MissingOutput { index: 0 })
        ));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bleed.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.jobs[0].source, dir.path().join("cards/front.png"));
        assert_eq!(config.output_dir, Some(dir.path().join("out")));
        assert_eq!(
            config.stages[1].control(),
            Some(dir.path().join("controls/corners.png").as_path())
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineConfig::load("/nonexistent/cardbleed.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
