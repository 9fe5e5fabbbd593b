//! Composite queries of a domain
//!
//!     Each domain is searched with four queries built from its labels and the global
//!     negation list (W is the composite window, N the negation window, P the punctuation
//!     marker):
//!
//!         positive   (PLUS_ONE near FEATURES, W)  not  (P | PROHIBITED | negation | MINUS_ONE)
//!                    or  (FEATURES near (negation then MINUS_ONE, W), W)  not  (P | PROHIBITED)
//!         negative   (MINUS_ONE near FEATURES, W)
//!                    or  (negation then FEATURES, N)
//!                    or  (FEATURES near (negation then PLUS_ONE, W), W)
//!                    not (P | PROHIBITED | (negation then MINUS_ONE, N))
//!
//!     "then" is an ordered near. The title queries are the same trees run against the
//!     title field. A branch whose sentiment or negation part is missing is left out; a
//!     missing FEATURES label only drops the feature clause.

use crate::sentex::extraction::record::ExtractionType;
use crate::sentex::index::Field;
use crate::sentex::normalization::PUNCTUATION_MARKER;
use crate::sentex::query::Query;
use crate::sentex::settings::ExtractionSettings;
use crate::sentex::vocabulary::{DomainVocabulary, Label};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Positive,
    Negative,
    TitlePositive,
    TitleNegative,
}

impl QueryKind {
    /// Execution order within a domain.
    pub const ALL: [QueryKind; 4] = [
        QueryKind::Positive,
        QueryKind::Negative,
        QueryKind::TitlePositive,
        QueryKind::TitleNegative,
    ];

    pub fn field(self) -> Field {
        match self {
            QueryKind::Positive | QueryKind::Negative => Field::Content,
            QueryKind::TitlePositive | QueryKind::TitleNegative => Field::Title,
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            QueryKind::Positive | QueryKind::TitlePositive => 1.0,
            QueryKind::Negative | QueryKind::TitleNegative => -1.0,
        }
    }

    pub fn extraction_type(self) -> ExtractionType {
        match self {
            QueryKind::Positive | QueryKind::Negative => ExtractionType::Content,
            QueryKind::TitlePositive | QueryKind::TitleNegative => ExtractionType::Title,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryKind::Positive => "positive",
            QueryKind::Negative => "negative",
            QueryKind::TitlePositive => "title positive",
            QueryKind::TitleNegative => "title negative",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct CompositeQuery {
    pub kind: QueryKind,
    pub query: Query,
    /// Excerpt words to highlight: literal terms of the query that are words of interest
    pub highlight: BTreeSet<String>,
}

/// The composite queries of one domain, in execution order.
#[derive(Debug, Clone)]
pub struct DomainQueries {
    domain: String,
    queries: Vec<CompositeQuery>,
}

impl DomainQueries {
    pub fn build(
        vocabulary: &DomainVocabulary,
        negation: Option<&Query>,
        settings: &ExtractionSettings,
    ) -> Self {
        let parts = Parts {
            features: vocabulary.query(Label::Features),
            prohibited: vocabulary.query(Label::Prohibited),
            plus: vocabulary.query(Label::PlusOne),
            minus: vocabulary.query(Label::MinusOne),
            negation: negation.cloned(),
            window: settings.composite_window,
            negation_window: settings.negation_window,
        };
        let positive = parts.positive();
        let negative = parts.negative();

        let mut queries = Vec::new();
        for kind in QueryKind::ALL {
            let query = match kind {
                QueryKind::Positive | QueryKind::TitlePositive => positive.clone(),
                QueryKind::Negative | QueryKind::TitleNegative => negative.clone(),
            };
            let Some(query) = query else {
                continue;
            };
            let highlight = match kind.field() {
                Field::Content => query
                    .included_terms()
                    .into_iter()
                    .filter(|term| vocabulary.words_of_interest().contains(*term))
                    .map(str::to_string)
                    .collect(),
                _ => BTreeSet::new(),
            };
            queries.push(CompositeQuery {
                kind,
                query,
                highlight,
            });
        }
        tracing::debug!(
            domain = vocabulary.domain(),
            queries = queries.len(),
            "built composite queries"
        );
        Self {
            domain: vocabulary.domain().to_string(),
            queries,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn queries(&self) -> &[CompositeQuery] {
        &self.queries
    }

    pub fn query(&self, kind: QueryKind) -> Option<&Query> {
        self.queries
            .iter()
            .find(|composite| composite.kind == kind)
            .map(|composite| &composite.query)
    }
}

struct Parts {
    features: Option<Query>,
    prohibited: Option<Query>,
    plus: Option<Query>,
    minus: Option<Query>,
    negation: Option<Query>,
    window: usize,
    negation_window: usize,
}

impl Parts {
    fn punctuation() -> Option<Query> {
        Some(Query::term(PUNCTUATION_MARKER))
    }

    /// `negation` followed by `sentiment`; `None` unless both exist.
    fn negated(&self, sentiment: &Option<Query>, window: usize) -> Option<Query> {
        match (&self.negation, sentiment) {
            (Some(negation), Some(sentiment)) => Some(Query::near(
                vec![negation.clone(), sentiment.clone()],
                window,
                true,
            )),
            _ => None,
        }
    }

    fn positive(&self) -> Option<Query> {
        let plus = self.plus.clone()?;
        let attitude = Query::near_of([Some(plus), self.features.clone()], self.window, false)?;
        let attitude = exclude(
            attitude,
            [
                Self::punctuation(),
                self.prohibited.clone(),
                self.negation.clone(),
                self.minus.clone(),
            ],
        );
        let not_bad = self
            .negated(&self.minus, self.window)
            .and_then(|not_bad| {
                Query::near_of([self.features.clone(), Some(not_bad)], self.window, false)
            })
            .map(|not_bad| exclude(not_bad, [Self::punctuation(), self.prohibited.clone()]));
        Query::any_of([not_bad, Some(attitude)])
    }

    fn negative(&self) -> Option<Query> {
        let bad_place = self.minus.clone().and_then(|minus| {
            Query::near_of([Some(minus), self.features.clone()], self.window, false)
        });
        let not_place = match (&self.negation, &self.features) {
            (Some(negation), Some(features)) => Some(Query::near(
                vec![negation.clone(), features.clone()],
                self.negation_window,
                true,
            )),
            _ => None,
        };
        let not_nice = self.negated(&self.plus, self.window).and_then(|not_nice| {
            Query::near_of([self.features.clone(), Some(not_nice)], self.window, false)
        });
        let negative = Query::any_of([bad_place, not_place, not_nice])?;
        Some(exclude(
            negative,
            [
                Self::punctuation(),
                self.prohibited.clone(),
                self.negated(&self.minus, self.negation_window),
            ],
        ))
    }
}

fn exclude<I>(query: Query, vetoes: I) -> Query
where
    I: IntoIterator<Item = Option<Query>>,
{
    match Query::any_of(vetoes) {
        Some(vetoes) => Query::not(query, vetoes),
        None => query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentex::settings::CompilerSettings;
    use crate::sentex::vocabulary::{MemorySource, VocabularyCompiler};

    fn domain(text: &str) -> DomainVocabulary {
        let source = MemorySource::new().with("test.vocab", text);
        VocabularyCompiler::new(&source, &CompilerSettings::default())
            .compile_domain("test")
            .unwrap()
    }

    fn negation() -> Query {
        Query::term("not")
    }

    #[test]
    fn full_domain_builds_all_branches() {
        let vocabulary = domain("FEATURES\n  room\nPLUS_ONE\n  CLEAN\nMINUS_ONE\n  dirty\n");
        let queries = DomainQueries::build(
            &vocabulary,
            Some(&negation()),
            &ExtractionSettings::default(),
        );
        assert_eq!(queries.queries().len(), 4);
        insta::assert_snapshot!(
            queries.query(QueryKind::Positive).unwrap().to_string(),
            @"spanOr([spanNot(spanNear([room, spanNear([not, dirty], 5, true)], 5, false), UTPUNCT), spanNot(spanNear([clean, room], 5, false), spanOr([UTPUNCT, not, dirty]))])"
        );
        insta::assert_snapshot!(
            queries.query(QueryKind::Negative).unwrap().to_string(),
            @"spanNot(spanOr([spanNear([dirty, room], 5, false), spanNear([not, room], 3, true), spanNear([room, spanNear([not, clean], 5, true)], 5, false)]), spanOr([UTPUNCT, spanNear([not, dirty], 3, true)]))"
        );
        let positive = &queries.queries()[0];
        assert_eq!(positive.kind, QueryKind::Positive);
        assert_eq!(positive.highlight.iter().collect::<Vec<_>>(), vec!["clean"]);
        assert!(queries.queries()[2].highlight.is_empty());
    }

    #[test]
    fn no_plus_one_means_no_positive_query() {
        let vocabulary = domain("FEATURES\n  room\nMINUS_ONE\n  dirty\n");
        let queries = DomainQueries::build(
            &vocabulary,
            Some(&negation()),
            &ExtractionSettings::default(),
        );
        assert!(queries.query(QueryKind::Positive).is_none());
        assert!(queries.query(QueryKind::TitlePositive).is_none());
        assert!(queries.query(QueryKind::Negative).is_some());
    }

    #[test]
    fn without_negation_only_plain_branches_remain() {
        let vocabulary = domain("FEATURES\n  room\nPLUS_ONE\n  clean\nMINUS_ONE\n  dirty\n");
        let queries = DomainQueries::build(&vocabulary, None, &ExtractionSettings::default());
        assert_eq!(
            queries.query(QueryKind::Positive).unwrap().to_string(),
            "spanNot(spanNear([clean, room], 5, false), spanOr([UTPUNCT, dirty]))"
        );
        assert_eq!(
            queries.query(QueryKind::Negative).unwrap().to_string(),
            "spanNot(spanNear([dirty, room], 5, false), UTPUNCT)"
        );
    }
}
