//! Shared configuration loader for the sentex toolchain.
//!
//! `defaults/sentex.default.toml` is embedded into every binary. A user file given with
//! `--config` is layered over it, and command line flags over both, through [`Loader`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use sentex_core::sentex::settings::{
    AssessmentSettings, CompilerSettings, ExtractionSettings, RenderLimits, ScoringSettings,
    Settings,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/sentex.default.toml");

/// Top-level configuration consumed by sentex applications.
#[derive(Debug, Clone, Deserialize)]
pub struct SentexConfig {
    pub vocabulary: VocabularyConfig,
    pub compiler: CompilerSettings,
    pub extraction: ExtractionSettings,
    pub scoring: ScoringSettings,
    pub render: RenderLimits,
    pub assessment: AssessmentSettings,
}

/// Where vocabulary files live and which domains to compile.
#[derive(Debug, Clone, Deserialize)]
pub struct VocabularyConfig {
    pub directory: PathBuf,
    pub domains: Vec<String>,
}

impl SentexConfig {
    /// The pipeline settings, without the vocabulary location.
    pub fn settings(&self) -> Settings {
        Settings {
            compiler: self.compiler.clone(),
            extraction: self.extraction.clone(),
            scoring: self.scoring.clone(),
            render: self.render.clone(),
            assessment: self.assessment.clone(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let title_weight = self.scoring.title_weight;
        if title_weight.is_nan() || title_weight <= 0.0 {
            return Err(ConfigError::Message(format!(
                "scoring.title_weight must be positive, got {}",
                title_weight
            )));
        }
        Ok(())
    }
}

/// Layers a user file and command line choices over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML configuration file. The file must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Read vocabularies from `directory` instead of the configured one.
    pub fn vocabulary_directory(self, directory: &str) -> Result<Self, ConfigError> {
        self.set("vocabulary.directory", directory)
    }

    /// Drop excerpts whose sentence contains a taboo phrase.
    pub fn polite(self) -> Result<Self, ConfigError> {
        self.set("extraction.polite", true)
    }

    pub fn workers(self, workers: usize) -> Result<Self, ConfigError> {
        self.set("extraction.workers", i64::try_from(workers).unwrap_or(i64::MAX))
    }

    fn set<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge the layers and deserialize them into a checked [`SentexConfig`].
    pub fn build(self) -> Result<SentexConfig, ConfigError> {
        let config: SentexConfig = self.builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
