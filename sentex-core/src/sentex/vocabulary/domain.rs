//! Compiling a domain vocabulary file
//!
//!     Line kinds, after stripping `#` comments and skipping blank lines:
//!
//!         LABEL [OVERRIDE]                      start (or reset) a label section
//!         INCLUDE <labels|*> FROM <domain>      import labels of another domain file
//!             <expression>                      indented: one entry of the current label
//!
//!     `OVERRIDE` only clears entries when the file is compiled directly; inside an included
//!     file it is ignored, so a domain can include a base vocabulary and then replace one of
//!     its labels without the base being able to wipe what the includer collected.
//!
//!     Compilation threads an [`Accumulator`] through every file of the include chain and
//!     freezes it into an immutable [`DomainVocabulary`] at the end.

use crate::sentex::error::VocabularyError;
use crate::sentex::query::Query;
use crate::sentex::settings::CompilerSettings;
use crate::sentex::vocabulary::expression::compile_expression;
use crate::sentex::vocabulary::source::{domain_resource, VocabularySource};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

static INCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^INCLUDE\s+(\*|\w+(?:\s*,\s*\w+)*)\s+FROM\s+(\w+)\s*$").unwrap()
});

/// Section labels of a domain file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Features,
    Prohibited,
    PlusOne,
    PlusHalf,
    MinusOne,
    MinusHalf,
}

impl Label {
    pub const ALL: [Label; 6] = [
        Label::Features,
        Label::Prohibited,
        Label::PlusOne,
        Label::PlusHalf,
        Label::MinusOne,
        Label::MinusHalf,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Label::Features => "FEATURES",
            Label::Prohibited => "PROHIBITED",
            Label::PlusOne => "PLUS_ONE",
            Label::PlusHalf => "PLUS_HALF",
            Label::MinusOne => "MINUS_ONE",
            Label::MinusHalf => "MINUS_HALF",
        }
    }
}

impl FromStr for Label {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Label::ALL
            .into_iter()
            .find(|label| label.name() == upper)
            .ok_or(())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The compiled vocabulary of one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainVocabulary {
    domain: String,
    entries: BTreeMap<Label, Vec<Query>>,
    words_of_interest: BTreeSet<String>,
}

impl DomainVocabulary {
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn entries(&self, label: Label) -> &[Query] {
        self.entries.get(&label).map_or(&[], Vec::as_slice)
    }

    /// All entries of a label as one query, or `None` when the label is empty.
    pub fn query(&self, label: Label) -> Option<Query> {
        Query::any_of(self.entries(label).iter().cloned().map(Some))
    }

    /// Lowercased literals that were written ALL-CAPS anywhere in the domain.
    pub fn words_of_interest(&self) -> &BTreeSet<String> {
        &self.words_of_interest
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    entries: BTreeMap<Label, Vec<Query>>,
    words_of_interest: BTreeSet<String>,
}

/// Compiles domain files read from a [`VocabularySource`].
pub struct VocabularyCompiler<'a> {
    source: &'a dyn VocabularySource,
    near_window: usize,
}

impl<'a> VocabularyCompiler<'a> {
    pub fn new(source: &'a dyn VocabularySource, settings: &CompilerSettings) -> Self {
        Self {
            source,
            near_window: settings.near_window,
        }
    }

    pub fn compile_domain(&self, domain: &str) -> Result<DomainVocabulary, VocabularyError> {
        let domain = domain.to_lowercase();
        let labels: BTreeSet<Label> = Label::ALL.into_iter().collect();
        let mut chain = Vec::new();
        let acc = self.read_domain(&domain, &labels, None, &mut chain, Accumulator::default())?;
        tracing::debug!(
            domain = %domain,
            labels = acc.entries.len(),
            words_of_interest = acc.words_of_interest.len(),
            "compiled vocabulary"
        );
        Ok(DomainVocabulary {
            domain,
            entries: acc.entries,
            words_of_interest: acc.words_of_interest,
        })
    }

    fn read_domain(
        &self,
        domain: &str,
        labels: &BTreeSet<Label>,
        parent: Option<&str>,
        chain: &mut Vec<String>,
        mut acc: Accumulator,
    ) -> Result<Accumulator, VocabularyError> {
        let file = domain_resource(domain);
        if chain.iter().any(|seen| seen == domain) {
            return Err(VocabularyError::at(
                &file,
                0,
                format!("Circular INCLUDE of domain '{}'", domain),
            )
            .referred_by(parent));
        }
        let text = self
            .source
            .read(&file)
            .map_err(|e| VocabularyError::unreadable(&file, e).referred_by(parent))?;
        chain.push(domain.to_string());

        let mut current: Option<Label> = None;
        for (index, raw) in text.lines().enumerate() {
            let fail =
                |message: String| VocabularyError::at(&file, index + 1, message).referred_by(parent);
            let line = strip_comment(raw);
            if line.trim().is_empty() {
                continue;
            }

            if line.starts_with(char::is_whitespace) {
                let expression = line.trim();
                let label =
                    current.ok_or_else(|| fail(format!("Term '{}' without label", expression)))?;
                if expression.ends_with(',') {
                    return Err(fail("Expected term after comma".to_string()));
                }
                if !labels.contains(&label) {
                    continue;
                }
                let query = compile_expression(
                    expression,
                    self.near_window,
                    Some(&mut acc.words_of_interest),
                )
                .map_err(|e| fail(e.to_string()))?;
                acc.entries.entry(label).or_default().push(query);
            } else if let Some(captures) = INCLUDE.captures(line) {
                let imported = parse_included_labels(&captures[1], labels).map_err(fail)?;
                let included = captures[2].to_lowercase();
                acc = self.read_domain(&included, &imported, Some(domain), chain, acc)?;
            } else {
                let mut words = line.split_whitespace();
                let name = words.next().unwrap_or_default();
                let label: Label = name
                    .parse()
                    .map_err(|_| fail(format!("Unknown label '{}'", name)))?;
                match words.next() {
                    None => {}
                    Some(directive) if directive.eq_ignore_ascii_case("OVERRIDE") => {
                        if parent.is_none() {
                            acc.entries.remove(&label);
                        }
                    }
                    Some(other) => return Err(fail(format!("Unknown directive '{}'", other))),
                }
                if let Some(extra) = words.next() {
                    return Err(fail(format!("Unknown directive '{}'", extra)));
                }
                current = Some(label);
            }
        }

        chain.pop();
        Ok(acc)
    }
}

fn strip_comment(line: &str) -> &str {
    line.find('#').map_or(line, |at| &line[..at])
}

fn parse_included_labels(
    selection: &str,
    current: &BTreeSet<Label>,
) -> Result<BTreeSet<Label>, String> {
    if selection == "*" {
        return Ok(current.clone());
    }
    selection
        .split(',')
        .map(str::trim)
        .map(|name| {
            name.parse::<Label>()
                .map_err(|_| format!("Invalid label name '{}' in INCLUDE", name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentex::vocabulary::source::MemorySource;

    fn compile(source: &MemorySource, domain: &str) -> Result<DomainVocabulary, VocabularyError> {
        VocabularyCompiler::new(source, &CompilerSettings::default()).compile_domain(domain)
    }

    fn terms(vocab: &DomainVocabulary, label: Label) -> Vec<String> {
        vocab
            .entries(label)
            .iter()
            .map(|query| query.to_string())
            .collect()
    }

    #[test]
    fn compiles_labels_and_entries() {
        let source = MemorySource::new().with(
            "cleanliness.vocab",
            "# cleanliness\nFEATURES\n    room,rooms # plural too\n\n    bathroom\nplus_one\n    SPOTLESS\n",
        );
        let vocab = compile(&source, "Cleanliness").unwrap();
        assert_eq!(vocab.domain(), "cleanliness");
        assert_eq!(
            terms(&vocab, Label::Features),
            vec!["spanOr([room, rooms])", "bathroom"]
        );
        assert_eq!(terms(&vocab, Label::PlusOne), vec!["spotless"]);
        assert!(vocab.entries(Label::MinusOne).is_empty());
        assert_eq!(vocab.query(Label::MinusOne), None);
        assert!(vocab.words_of_interest().contains("spotless"));
    }

    #[test]
    fn include_imports_selected_labels() {
        let source = MemorySource::new()
            .with("base.vocab", "PLUS_ONE\n    great\nMINUS_ONE\n    awful\nFEATURES\n    hotel\n")
            .with("overall.vocab", "INCLUDE plus_one FROM base\nFEATURES\n    stay\n");
        let vocab = compile(&source, "overall").unwrap();
        assert_eq!(terms(&vocab, Label::PlusOne), vec!["great"]);
        assert_eq!(terms(&vocab, Label::Features), vec!["stay"]);
        assert!(vocab.entries(Label::MinusOne).is_empty());
    }

    #[test]
    fn include_star_imports_current_labels() {
        let source = MemorySource::new()
            .with("base.vocab", "PLUS_ONE\n    great\nMINUS_ONE\n    awful\n")
            .with("inner.vocab", "INCLUDE * FROM base\n")
            .with("outer.vocab", "INCLUDE MINUS_ONE FROM inner\n");
        let vocab = compile(&source, "outer").unwrap();
        assert_eq!(terms(&vocab, Label::MinusOne), vec!["awful"]);
        assert!(vocab.entries(Label::PlusOne).is_empty());
    }

    #[test]
    fn override_clears_only_at_top_level() {
        let source = MemorySource::new()
            .with("base.vocab", "PLUS_ONE\n    great\n")
            .with("reset.vocab", "PLUS_ONE OVERRIDE\n    fine\n")
            .with(
                "staff.vocab",
                "INCLUDE * FROM base\nINCLUDE * FROM reset\nPLUS_ONE\n    helpful\n",
            )
            .with(
                "value.vocab",
                "INCLUDE * FROM base\nPLUS_ONE OVERRIDE\n    cheap\n",
            );
        let staff = compile(&source, "staff").unwrap();
        assert_eq!(terms(&staff, Label::PlusOne), vec!["great", "fine", "helpful"]);
        let value = compile(&source, "value").unwrap();
        assert_eq!(terms(&value, Label::PlusOne), vec!["cheap"]);
    }

    #[test]
    fn errors_carry_file_and_line() {
        let source = MemorySource::new()
            .with("a.vocab", "FEATURES\n    room\nFEATURE\n    rooms\n")
            .with("b.vocab", "    room\n")
            .with("c.vocab", "FEATURES\n    room,\n")
            .with("d.vocab", "FEATURES ALWAYS\n")
            .with("e.vocab", "INCLUDE FEATURE FROM a\n")
            .with("f.vocab", "INCLUDE * FROM missing\n");
        let err = compile(&source, "a").unwrap_err();
        assert_eq!(err.to_string(), "Unknown label 'FEATURE' in file a.vocab line 3");
        let err = compile(&source, "b").unwrap_err();
        assert_eq!(err.to_string(), "Term 'room' without label in file b.vocab line 1");
        let err = compile(&source, "c").unwrap_err();
        assert_eq!(err.to_string(), "Expected term after comma in file c.vocab line 2");
        let err = compile(&source, "d").unwrap_err();
        assert_eq!(err.to_string(), "Unknown directive 'ALWAYS' in file d.vocab line 1");
        let err = compile(&source, "e").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid label name 'FEATURE' in INCLUDE in file e.vocab line 1"
        );
        let err = compile(&source, "f").unwrap_err();
        assert_eq!(err.file, "missing.vocab");
        assert_eq!(err.referred_by.as_deref(), Some("f"));
    }

    #[test]
    fn errors_inside_included_files_name_the_includer() {
        let source = MemorySource::new()
            .with("base.vocab", "PLUS_ONE\n    & great\n")
            .with("overall.vocab", "FEATURES\n    hotel\nINCLUDE * FROM base\n");
        let err = compile(&source, "overall").unwrap_err();
        assert_eq!(
            err.to_string(),
            "No value set for window in file base.vocab line 2 referred to by overall"
        );
    }

    #[test]
    fn circular_includes_are_rejected() {
        let source = MemorySource::new()
            .with("a.vocab", "INCLUDE * FROM b\n")
            .with("b.vocab", "INCLUDE * FROM a\n");
        let err = compile(&source, "a").unwrap_err();
        assert_eq!(err.message, "Circular INCLUDE of domain 'a'");
        assert_eq!(err.referred_by.as_deref(), Some("b"));
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("minus_one".parse::<Label>(), Ok(Label::MinusOne));
        assert_eq!("PLUS_HALF".parse::<Label>(), Ok(Label::PlusHalf));
        assert!("PLUS".parse::<Label>().is_err());
    }
}
