//! Span query trees
//!
//!     Every vocabulary expression compiles into a small tree of span queries. Leaves match
//!     single tokens; inner nodes combine the spans of their children:
//!
//!         Term       one literal, lowercase token
//!         Pattern    any token matching an anchored, case-insensitive regex
//!         Near       children within `window` tokens of each other, optionally in order
//!         Or         union of the children's spans
//!         Not        spans of `include` that overlap no span of `exclude`
//!
//!     Trees never reference a field or a document; the field is picked when the query is
//!     handed to a [`SpanIndex`](crate::sentex::index::SpanIndex). Once built they are
//!     shared read-only across documents, fields and worker threads.
//!
//!     Composite queries are assembled from optional pieces (a domain may have no
//!     prohibited words, a deployment may have no negation list), so [`Query::near_of`]
//!     and [`Query::any_of`] drop missing pieces and collapse single-child nodes.

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

/// A pattern leaf, e.g. the expansion of the `@NUMERAL` macro.
#[derive(Debug, Clone)]
pub struct TermPattern {
    source: String,
    regex: Regex,
}

impl TermPattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?i:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, token: &str) -> bool {
        self.regex.is_match(token)
    }
}

impl PartialEq for TermPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Term(String),
    Pattern(TermPattern),
    Near {
        clauses: Vec<Query>,
        window: usize,
        in_order: bool,
    },
    Or(Vec<Query>),
    Not {
        include: Box<Query>,
        exclude: Box<Query>,
    },
}

impl Query {
    pub fn term(text: impl Into<String>) -> Self {
        Query::Term(text.into())
    }

    pub fn near(clauses: Vec<Query>, window: usize, in_order: bool) -> Self {
        Query::Near {
            clauses,
            window,
            in_order,
        }
    }

    pub fn not(include: Query, exclude: Query) -> Self {
        Query::Not {
            include: Box::new(include),
            exclude: Box::new(exclude),
        }
    }

    /// Near over the present parts; `None` when nothing is present.
    pub fn near_of<I>(parts: I, window: usize, in_order: bool) -> Option<Query>
    where
        I: IntoIterator<Item = Option<Query>>,
    {
        let mut clauses: Vec<Query> = parts.into_iter().flatten().collect();
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Query::near(clauses, window, in_order)),
        }
    }

    /// Union of the present parts; `None` when nothing is present.
    pub fn any_of<I>(parts: I) -> Option<Query>
    where
        I: IntoIterator<Item = Option<Query>>,
    {
        let mut clauses: Vec<Query> = parts.into_iter().flatten().collect();
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Query::Or(clauses)),
        }
    }

    /// Literal terms that can contribute to a match.
    ///
    /// The excluded side of a `Not` is skipped: its terms only ever veto a match.
    pub fn included_terms(&self) -> BTreeSet<&str> {
        let mut terms = BTreeSet::new();
        self.collect_terms(&mut terms);
        terms
    }

    fn collect_terms<'a>(&'a self, terms: &mut BTreeSet<&'a str>) {
        match self {
            Query::Term(text) => {
                terms.insert(text.as_str());
            }
            Query::Pattern(_) => {}
            Query::Near { clauses, .. } | Query::Or(clauses) => {
                for clause in clauses {
                    clause.collect_terms(terms);
                }
            }
            Query::Not { include, .. } => include.collect_terms(terms),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, clauses: &[Query]) -> fmt::Result {
    write!(f, "[")?;
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", clause)?;
    }
    write!(f, "]")
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Term(text) => write!(f, "{}", text),
            Query::Pattern(pattern) => write!(f, "/{}/", pattern.source()),
            Query::Near {
                clauses,
                window,
                in_order,
            } => {
                write!(f, "spanNear(")?;
                write_list(f, clauses)?;
                write!(f, ", {}, {})", window, in_order)
            }
            Query::Or(clauses) => {
                write!(f, "spanOr(")?;
                write_list(f, clauses)?;
                write!(f, ")")
            }
            Query::Not { include, exclude } => write!(f, "spanNot({}, {})", include, exclude),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(text: &str) -> Option<Query> {
        Some(Query::term(text))
    }

    #[test]
    fn near_of_drops_missing_parts() {
        assert_eq!(Query::near_of([None, None], 5, false), None);
        assert_eq!(Query::near_of([t("clean"), None], 5, false), t("clean"));
        assert_eq!(
            Query::near_of([t("clean"), t("room")], 5, false),
            Some(Query::near(
                vec![Query::term("clean"), Query::term("room")],
                5,
                false
            ))
        );
    }

    #[test]
    fn any_of_collapses_single_child() {
        assert_eq!(Query::any_of([None, t("dirty")]), t("dirty"));
        assert_eq!(Query::any_of(Vec::new()), None);
    }

    #[test]
    fn renders_like_span_queries() {
        let query = Query::not(
            Query::near(vec![Query::term("clean"), Query::term("room")], 5, false),
            Query::any_of([t("UTPUNCT"), t("dirty")]).unwrap(),
        );
        insta::assert_snapshot!(
            query.to_string(),
            @"spanNot(spanNear([clean, room], 5, false), spanOr([UTPUNCT, dirty]))"
        );
    }

    #[test]
    fn included_terms_skip_exclusions() {
        let query = Query::not(
            Query::Or(vec![
                Query::term("clean"),
                Query::Pattern(TermPattern::new("utnum.+").unwrap()),
            ]),
            Query::term("not"),
        );
        let terms: Vec<&str> = query.included_terms().into_iter().collect();
        assert_eq!(terms, vec!["clean"]);
    }

    #[test]
    fn patterns_are_anchored_and_case_insensitive() {
        let pattern = TermPattern::new("utnum.+").unwrap();
        assert!(pattern.matches("UTNUM2"));
        assert!(pattern.matches("utnum000"));
        assert!(!pattern.matches("utnum"));
        assert!(!pattern.matches("xutnum2"));
    }
}
