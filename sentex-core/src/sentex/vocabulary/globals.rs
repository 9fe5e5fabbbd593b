//! Domain-independent vocabulary lists
//!
//! | resource             | one line is                                   |
//! |----------------------|-----------------------------------------------|
//! | `negation.txt`       | an expression, compiled like a domain entry   |
//! | `hard_overrides.txt` | an expression matched against titles          |
//! | `taboo.txt`          | a phrase; its words must appear in order      |
//! | `substitutions.txt`  | a case-insensitive regex used by normalization |
//!
//! Missing files are treated as empty lists.

use crate::sentex::error::VocabularyError;
use crate::sentex::query::Query;
use crate::sentex::settings::CompilerSettings;
use crate::sentex::vocabulary::expression::compile_expression;
use crate::sentex::vocabulary::source::VocabularySource;
use regex::{Regex, RegexBuilder};
use std::io;

pub const NEGATION_RESOURCE: &str = "negation.txt";
pub const HARD_OVERRIDES_RESOURCE: &str = "hard_overrides.txt";
pub const TABOO_RESOURCE: &str = "taboo.txt";
pub const SUBSTITUTIONS_RESOURCE: &str = "substitutions.txt";

#[derive(Debug, Clone, Default)]
pub struct GlobalVocabulary {
    negation: Option<Query>,
    hard_overrides: Option<Query>,
    taboo: Option<Query>,
    substitutions: Vec<Regex>,
}

impl GlobalVocabulary {
    pub fn load(
        source: &dyn VocabularySource,
        settings: &CompilerSettings,
    ) -> Result<Self, VocabularyError> {
        let negation = load_expressions(source, NEGATION_RESOURCE, settings.near_window)?;
        let hard_overrides =
            load_expressions(source, HARD_OVERRIDES_RESOURCE, settings.near_window)?;
        let taboo = load_taboo(source)?;
        let substitutions = load_substitutions(source)?;
        tracing::debug!(
            negation = negation.is_some(),
            hard_overrides = hard_overrides.is_some(),
            taboo = taboo.is_some(),
            substitutions = substitutions.len(),
            "loaded global vocabulary"
        );
        Ok(Self {
            negation,
            hard_overrides,
            taboo,
            substitutions,
        })
    }

    pub fn negation(&self) -> Option<&Query> {
        self.negation.as_ref()
    }

    pub fn hard_overrides(&self) -> Option<&Query> {
        self.hard_overrides.as_ref()
    }

    pub fn taboo(&self) -> Option<&Query> {
        self.taboo.as_ref()
    }

    pub fn substitutions(&self) -> &[Regex] {
        &self.substitutions
    }
}

fn read_optional(
    source: &dyn VocabularySource,
    resource: &str,
) -> Result<Option<String>, VocabularyError> {
    match source.read(resource) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(resource, "global vocabulary list not found, using an empty list");
            Ok(None)
        }
        Err(e) => Err(VocabularyError::unreadable(resource, e)),
    }
}

/// Comment-stripped, trimmed, non-empty lines with their one-based numbers.
fn entries(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().filter_map(|(index, line)| {
        let line = line.find('#').map_or(line, |at| &line[..at]).trim();
        (!line.is_empty()).then_some((index + 1, line))
    })
}

fn load_expressions(
    source: &dyn VocabularySource,
    resource: &str,
    near_window: usize,
) -> Result<Option<Query>, VocabularyError> {
    let Some(text) = read_optional(source, resource)? else {
        return Ok(None);
    };
    let mut queries = Vec::new();
    for (line, expression) in entries(&text) {
        let query = compile_expression(expression, near_window, None)
            .map_err(|e| VocabularyError::at(resource, line, e.to_string()))?;
        queries.push(Some(query));
    }
    Ok(Query::any_of(queries))
}

fn load_taboo(source: &dyn VocabularySource) -> Result<Option<Query>, VocabularyError> {
    let Some(text) = read_optional(source, TABOO_RESOURCE)? else {
        return Ok(None);
    };
    let phrases = entries(&text).map(|(_, phrase)| {
        let words = phrase
            .split_whitespace()
            .map(|word| Some(Query::term(word.to_lowercase())));
        Query::near_of(words, 1, true)
    });
    Ok(Query::any_of(phrases.collect::<Vec<_>>()))
}

fn load_substitutions(source: &dyn VocabularySource) -> Result<Vec<Regex>, VocabularyError> {
    let Some(text) = read_optional(source, SUBSTITUTIONS_RESOURCE)? else {
        return Ok(Vec::new());
    };
    entries(&text)
        .map(|(line, pattern)| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    VocabularyError::at(
                        SUBSTITUTIONS_RESOURCE,
                        line,
                        format!("Invalid substitution pattern '{}': {}", pattern, e),
                    )
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentex::vocabulary::source::MemorySource;

    fn load(source: &MemorySource) -> Result<GlobalVocabulary, VocabularyError> {
        GlobalVocabulary::load(source, &CompilerSettings::default())
    }

    #[test]
    fn missing_lists_are_empty() {
        let globals = load(&MemorySource::new()).unwrap();
        assert!(globals.negation().is_none());
        assert!(globals.hard_overrides().is_none());
        assert!(globals.taboo().is_none());
        assert!(globals.substitutions().is_empty());
    }

    #[test]
    fn compiles_each_list() {
        let source = MemorySource::new()
            .with(NEGATION_RESOURCE, "# negators\nnot\nnever,hardly\n")
            .with(HARD_OVERRIDES_RESOURCE, "stay away\n")
            .with(TABOO_RESOURCE, "Holy Crap\n")
            .with(SUBSTITUTIONS_RESOURCE, "not to mention\n");
        let globals = load(&source).unwrap();
        assert_eq!(
            globals.negation().unwrap().to_string(),
            "spanOr([not, spanOr([never, hardly])])"
        );
        assert_eq!(
            globals.hard_overrides().unwrap().to_string(),
            "spanNear([stay, away], 1, true)"
        );
        assert_eq!(
            globals.taboo().unwrap().to_string(),
            "spanNear([holy, crap], 1, true)"
        );
        assert!(globals.substitutions()[0].is_match("Not To Mention"));
    }

    #[test]
    fn invalid_substitution_reports_line() {
        let source = MemorySource::new().with(SUBSTITUTIONS_RESOURCE, "fine\n(unclosed\n");
        let err = load(&source).unwrap_err();
        assert_eq!(err.file, SUBSTITUTIONS_RESOURCE);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn invalid_negation_reports_line() {
        let source = MemorySource::new().with(NEGATION_RESOURCE, "not\n\"never\n");
        let err = load(&source).unwrap_err();
        assert_eq!(err.to_string(), "Uneven quotes in '\"never' in file negation.txt line 2");
    }
}
