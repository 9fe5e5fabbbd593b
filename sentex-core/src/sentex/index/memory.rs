//! In-memory span index
//!
//! Postings map every token of a searchable field to the positions it occurs at, per
//! document. Queries are evaluated bottom-up into per-document span lists with these
//! semantics:
//!
//! - term and pattern leaves yield one-token spans;
//! - an ordered near needs its clauses in order, non-overlapping, with the summed gaps
//!   between consecutive clauses at most `window`;
//! - an unordered near needs `(max end - min start) - sum of lengths <= window`;
//! - or is the sorted union of its clauses;
//! - not keeps the included spans that overlap no excluded span.
//!
//! Every span produced (and every combination a near tries) is charged against the
//! index's span budget; running out fails the query with [`QueryError::SpanLimit`].

use crate::sentex::error::QueryError;
use crate::sentex::index::{Field, HitSpan, SpanIndex};
use crate::sentex::normalization::PreparedDocument;
use crate::sentex::query::Query;
use std::collections::{BTreeMap, BTreeSet, HashMap};

type Span = (usize, usize);
type DocSpans = BTreeMap<usize, Vec<Span>>;

#[derive(Debug, Default)]
struct Postings {
    terms: HashMap<String, BTreeMap<usize, Vec<usize>>>,
}

impl Postings {
    fn add(&mut self, doc: usize, tokens: &[String]) {
        for (position, token) in tokens.iter().enumerate() {
            self.terms
                .entry(token.clone())
                .or_default()
                .entry(doc)
                .or_default()
                .push(position);
        }
    }
}

#[derive(Debug)]
pub struct MemoryIndex {
    documents: Vec<PreparedDocument>,
    content: Postings,
    title: Postings,
    span_limit: usize,
}

impl MemoryIndex {
    pub fn build(documents: Vec<PreparedDocument>, span_limit: usize) -> Self {
        let mut content = Postings::default();
        let mut title = Postings::default();
        for (doc, document) in documents.iter().enumerate() {
            content.add(doc, &document.content);
            title.add(doc, &document.title);
        }
        tracing::debug!(
            documents = documents.len(),
            content_terms = content.terms.len(),
            title_terms = title.terms.len(),
            "built memory index"
        );
        Self {
            documents,
            content,
            title,
            span_limit,
        }
    }

    pub fn documents(&self) -> &[PreparedDocument] {
        &self.documents
    }
}

impl SpanIndex for MemoryIndex {
    fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn document_id(&self, doc: usize) -> Option<&str> {
        self.documents.get(doc).map(|document| document.id.as_str())
    }

    fn field_text(&self, doc: usize, field: Field) -> Option<&[String]> {
        let document = self.documents.get(doc)?;
        let tokens = match field {
            Field::Content => &document.content,
            Field::Title => &document.title,
            Field::ContentOriginal => &document.content_original,
            Field::TitleOriginal => &document.title_original,
        };
        Some(tokens.as_slice())
    }

    fn search<'a>(
        &'a self,
        query: &Query,
        field: Field,
    ) -> Result<Box<dyn Iterator<Item = HitSpan> + 'a>, QueryError> {
        let postings = match field {
            Field::Content => &self.content,
            Field::Title => &self.title,
            Field::ContentOriginal | Field::TitleOriginal => {
                return Err(QueryError::UnsearchableField(field))
            }
        };
        let mut evaluation = Evaluation {
            postings,
            limit: self.span_limit,
            used: 0,
            query,
        };
        let spans = evaluation.spans(query)?;
        let hits = spans.into_iter().flat_map(|(doc, spans)| {
            spans
                .into_iter()
                .map(move |(start, end)| HitSpan::new(doc, start, end))
        });
        Ok(Box::new(hits))
    }
}

struct Evaluation<'a> {
    postings: &'a Postings,
    limit: usize,
    used: usize,
    query: &'a Query,
}

impl Evaluation<'_> {
    fn charge(&mut self, spans: usize) -> Result<(), QueryError> {
        self.used += spans;
        if self.used > self.limit {
            return Err(QueryError::SpanLimit {
                query: self.query.to_string(),
                limit: self.limit,
            });
        }
        Ok(())
    }

    fn spans(&mut self, query: &Query) -> Result<DocSpans, QueryError> {
        let spans: DocSpans = match query {
            Query::Term(text) => match self.postings.terms.get(text) {
                Some(docs) => docs
                    .iter()
                    .map(|(doc, positions)| {
                        (*doc, positions.iter().map(|p| (*p, *p + 1)).collect())
                    })
                    .collect(),
                None => DocSpans::new(),
            },
            Query::Pattern(pattern) => self.matching(|term| pattern.matches(term)),
            Query::Or(clauses) => {
                let mut union: BTreeMap<usize, BTreeSet<Span>> = BTreeMap::new();
                for clause in clauses {
                    for (doc, spans) in self.spans(clause)? {
                        union.entry(doc).or_default().extend(spans);
                    }
                }
                collect(union)
            }
            Query::Not { include, exclude } => {
                let included = self.spans(include)?;
                let excluded = self.spans(exclude)?;
                included
                    .into_iter()
                    .filter_map(|(doc, spans)| {
                        let vetoes = excluded.get(&doc).map_or(&[][..], Vec::as_slice);
                        let kept: Vec<Span> = spans
                            .into_iter()
                            .filter(|span| !vetoes.iter().any(|veto| overlaps(*span, *veto)))
                            .collect();
                        (!kept.is_empty()).then_some((doc, kept))
                    })
                    .collect()
            }
            Query::Near {
                clauses,
                window,
                in_order,
            } => self.near(clauses, *window, *in_order)?,
        };
        let produced = spans.values().map(Vec::len).sum();
        self.charge(produced)?;
        Ok(spans)
    }

    /// One-token spans of every indexed term `accept`s.
    fn matching(&self, accept: impl Fn(&str) -> bool) -> DocSpans {
        let mut found: BTreeMap<usize, BTreeSet<Span>> = BTreeMap::new();
        for (term, docs) in &self.postings.terms {
            if !accept(term) {
                continue;
            }
            for (doc, positions) in docs {
                found
                    .entry(*doc)
                    .or_default()
                    .extend(positions.iter().map(|p| (*p, *p + 1)));
            }
        }
        collect(found)
    }

    fn near(
        &mut self,
        clauses: &[Query],
        window: usize,
        in_order: bool,
    ) -> Result<DocSpans, QueryError> {
        let mut evaluated = Vec::with_capacity(clauses.len());
        for clause in clauses {
            evaluated.push(self.spans(clause)?);
        }
        let Some((first, rest)) = evaluated.split_first() else {
            return Ok(DocSpans::new());
        };

        let mut result = DocSpans::new();
        for (doc, anchors) in first {
            let others: Option<Vec<&[Span]>> = rest
                .iter()
                .map(|spans| spans.get(doc).map(Vec::as_slice))
                .collect();
            let Some(others) = others else {
                continue;
            };
            let mut matches = BTreeSet::new();
            for anchor in anchors {
                if in_order {
                    if let Some(found) = ordered_match(*anchor, &others, window) {
                        matches.insert(found);
                    }
                } else {
                    let reach = window
                        + anchor.1
                        - anchor.0
                        + others.iter().map(|spans| max_length(spans)).sum::<usize>();
                    let mut search = Unordered {
                        others: &others,
                        window,
                        reach,
                        anchor: *anchor,
                        matches: &mut matches,
                    };
                    search.combine(self, 0, *anchor, anchor.1 - anchor.0)?;
                }
            }
            if !matches.is_empty() {
                result.insert(*doc, matches.into_iter().collect());
            }
        }
        Ok(result)
    }
}

/// Extend `anchor` with the earliest non-overlapping span of each following clause.
fn ordered_match(anchor: Span, others: &[&[Span]], window: usize) -> Option<Span> {
    let mut end = anchor.1;
    let mut gap = 0;
    for spans in others {
        let at = spans.partition_point(|span| span.0 < end);
        let next = spans.get(at)?;
        gap += next.0 - end;
        if gap > window {
            return None;
        }
        end = next.1;
    }
    Some((anchor.0, end))
}

struct Unordered<'s> {
    others: &'s [&'s [Span]],
    window: usize,
    reach: usize,
    anchor: Span,
    matches: &'s mut BTreeSet<Span>,
}

impl Unordered<'_> {
    fn combine(
        &mut self,
        evaluation: &mut Evaluation<'_>,
        clause: usize,
        range: Span,
        total_length: usize,
    ) -> Result<(), QueryError> {
        let Some(spans) = self.others.get(clause) else {
            let slop = (range.1 - range.0).saturating_sub(total_length);
            if slop <= self.window {
                self.matches.insert(range);
            }
            return Ok(());
        };
        let low = self.anchor.0.saturating_sub(self.reach);
        let high = self.anchor.1 + self.reach;
        for span in spans.iter().filter(|span| span.1 > low && span.0 < high) {
            evaluation.charge(1)?;
            let widened = (range.0.min(span.0), range.1.max(span.1));
            self.combine(evaluation, clause + 1, widened, total_length + span.1 - span.0)?;
        }
        Ok(())
    }
}

fn collect(spans: BTreeMap<usize, BTreeSet<Span>>) -> DocSpans {
    spans
        .into_iter()
        .map(|(doc, spans)| (doc, spans.into_iter().collect()))
        .collect()
}

fn max_length(spans: &[Span]) -> usize {
    spans.iter().map(|span| span.1 - span.0).max().unwrap_or(0)
}

fn overlaps(a: Span, b: Span) -> bool {
    a.0 < b.1 && b.0 < a.1
}
