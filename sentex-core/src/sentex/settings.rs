//! Tunable knobs for every stage of the pipeline.
//!
//! All structs deserialize with defaults so that partial configuration files work. The
//! defaults here mirror `sentex-config/defaults/sentex.default.toml`.

use serde::{Deserialize, Serialize};

/// Everything the analyzer needs besides the vocabulary itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub compiler: CompilerSettings,
    pub extraction: ExtractionSettings,
    pub scoring: ScoringSettings,
    pub render: RenderLimits,
    pub assessment: AssessmentSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Window used when chaining bare terms of one expression
    pub near_window: usize,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self { near_window: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Window joining sentiment words with features
    pub composite_window: usize,
    /// Window of the "not a <feature>" and "not bad" constructions
    pub negation_window: usize,
    /// Drop excerpts whose sentence contains a taboo phrase
    pub polite: bool,
    /// Upper bound on domain worker threads
    pub workers: usize,
    /// Maximum number of spans one query evaluation may produce
    pub span_limit: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            composite_window: 5,
            negation_window: 3,
            polite: false,
            workers: 4,
            span_limit: 100_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub title_weight: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self { title_weight: 2.0 }
    }
}

/// Character caps applied when rendering final records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderLimits {
    pub max_quote_length: usize,
    pub max_annotated_quote_length: usize,
    pub max_title_length: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_quote_length: 512,
            max_annotated_quote_length: 640,
            max_title_length: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentSettings {
    /// Domains with fewer final records than this score 0
    pub min_evidence: usize,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self { min_evidence: 3 }
    }
}
