//! Error types for vocabulary compilation, query execution and record collection
//!
//! Each stage owns its own error type. Vocabulary errors stop compilation of one domain,
//! query errors are recovered by the extraction driver (the query is treated as having no
//! hits), and consistency violations signal a broken internal invariant and are never
//! repaired silently.

use crate::sentex::index::Field;
use std::io;
use thiserror::Error;

/// A structural problem found while compiling a vocabulary file.
#[derive(Debug, Error)]
#[error("{message} in file {file} line {line}{}", referred_suffix(.referred_by))]
pub struct VocabularyError {
    /// Resource name of the offending file (e.g. `cleanliness.vocab`)
    pub file: String,
    /// One-based line number, 0 when the problem concerns the whole file
    pub line: usize,
    pub message: String,
    /// Domain whose `INCLUDE` pulled in the offending file
    pub referred_by: Option<String>,
    #[source]
    pub source: Option<io::Error>,
}

fn referred_suffix(parent: &Option<String>) -> String {
    match parent {
        Some(parent) => format!(" referred to by {}", parent),
        None => String::new(),
    }
}

impl VocabularyError {
    pub fn at(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
            referred_by: None,
            source: None,
        }
    }

    pub fn unreadable(file: impl Into<String>, source: io::Error) -> Self {
        Self {
            file: file.into(),
            line: 0,
            message: "Unable to read vocabulary".to_string(),
            referred_by: None,
            source: Some(source),
        }
    }

    /// Attach the including domain, keeping the innermost one if already set.
    pub fn referred_by(mut self, parent: Option<&str>) -> Self {
        if self.referred_by.is_none() {
            self.referred_by = parent.map(str::to_string);
        }
        self
    }
}

/// Failures raised by a span index while executing a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Evaluation produced more intermediate spans than the index allows
    #[error("span budget of {limit} exceeded while evaluating {query}")]
    SpanLimit { query: String, limit: usize },
    /// The field holds display text only and cannot be searched
    #[error("field {0} is not searchable")]
    UnsearchableField(Field),
}

/// A broken internal invariant, e.g. an index span outside its field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("consistency violation: {0}")]
pub struct ConsistencyViolation(pub String);

/// Everything that can stop a whole analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
    #[error(transparent)]
    Consistency(#[from] ConsistencyViolation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_error_names_file_and_line() {
        let err = VocabularyError::at("staff.vocab", 7, "Unknown label 'FEATURE'");
        assert_eq!(
            err.to_string(),
            "Unknown label 'FEATURE' in file staff.vocab line 7"
        );
    }

    #[test]
    fn vocabulary_error_names_including_domain() {
        let err = VocabularyError::at("base.vocab", 3, "Expected term after comma")
            .referred_by(Some("overall"))
            .referred_by(Some("outer"));
        assert_eq!(
            err.to_string(),
            "Expected term after comma in file base.vocab line 3 referred to by overall"
        );
    }
}
