//! The extraction driver

use crate::sentex::collecting::{RecordCollector, RecordSet};
use crate::sentex::document::parse_document_id;
use crate::sentex::error::ConsistencyViolation;
use crate::sentex::extraction::composite::DomainQueries;
use crate::sentex::extraction::excerpt;
use crate::sentex::extraction::record::{CandidateRecord, ExtractionType};
use crate::sentex::index::{Field, HitSpan, SpanIndex};
use crate::sentex::normalization::Normalizer;
use crate::sentex::query::Query;
use crate::sentex::settings::Settings;
use crate::sentex::vocabulary::{DomainVocabulary, GlobalVocabulary};
use crossbeam_channel::{bounded, unbounded};
use std::collections::{BTreeSet, HashMap};
use std::thread;

/// Records in flight between domain workers and the collector.
const RECORD_BUFFER: usize = 1024;

type TabooSpans = HashMap<usize, Vec<(usize, usize)>>;

/// One query execution: what to search and how to label the hits.
struct Pass<'a> {
    query: &'a Query,
    field: Field,
    weight: f64,
    domain: &'a str,
    extraction_type: ExtractionType,
    highlight: &'a BTreeSet<String>,
    taboo: Option<&'a TabooSpans>,
}

/// Runs compiled queries over a span index.
#[derive(Debug, Clone)]
pub struct Extractor {
    domains: Vec<DomainQueries>,
    hard_overrides: Option<Query>,
    taboo: Option<Query>,
    settings: Settings,
}

impl Extractor {
    pub fn new(
        vocabularies: &[DomainVocabulary],
        globals: &GlobalVocabulary,
        settings: &Settings,
    ) -> Self {
        let domains = vocabularies
            .iter()
            .map(|vocabulary| {
                DomainQueries::build(vocabulary, globals.negation(), &settings.extraction)
            })
            .collect();
        Self {
            domains,
            hard_overrides: globals.hard_overrides().cloned(),
            taboo: globals.taboo().cloned(),
            settings: settings.clone(),
        }
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(DomainQueries::domain)
    }

    pub fn domain_queries(&self) -> &[DomainQueries] {
        &self.domains
    }

    /// Run every query against `index` and collect the surviving records.
    pub fn extract(
        &self,
        index: &dyn SpanIndex,
        normalizer: &Normalizer,
    ) -> Result<RecordSet, ConsistencyViolation> {
        let mut collector = RecordCollector::new();
        let no_highlight = BTreeSet::new();

        if let Some(hard_overrides) = &self.hard_overrides {
            let pass = Pass {
                query: hard_overrides,
                field: Field::Title,
                weight: -1.0,
                domain: "",
                extraction_type: ExtractionType::Override,
                highlight: &no_highlight,
                taboo: None,
            };
            for record in run(index, &pass)? {
                collector.add(record);
            }
        }

        let taboo = match (&self.taboo, self.settings.extraction.polite) {
            (Some(taboo), true) => taboo_spans(index, taboo),
            _ => TabooSpans::new(),
        };

        self.run_domains(index, &taboo, &mut collector)?;
        tracing::debug!(
            documents = index.document_count(),
            records = collector.len(),
            "extraction finished"
        );
        Ok(collector.into_record_set(
            normalizer.clone(),
            &self.settings.scoring,
            &self.settings.render,
        ))
    }

    fn run_domains(
        &self,
        index: &dyn SpanIndex,
        taboo: &TabooSpans,
        collector: &mut RecordCollector,
    ) -> Result<(), ConsistencyViolation> {
        if self.domains.is_empty() {
            return Ok(());
        }
        let workers = self.settings.extraction.workers.clamp(1, self.domains.len());
        let (job_sender, jobs) = unbounded::<&DomainQueries>();
        for domain in &self.domains {
            if job_sender.send(domain).is_err() {
                break;
            }
        }
        drop(job_sender);

        let (sender, receiver) = bounded(RECORD_BUFFER);
        thread::scope(|scope| {
            for _ in 0..workers {
                let jobs = jobs.clone();
                let sender = sender.clone();
                scope.spawn(move || {
                    for domain in jobs.iter() {
                        tracing::debug!(domain = domain.domain(), "extracting domain");
                        let messages: Vec<Result<CandidateRecord, ConsistencyViolation>> =
                            match domain_records(index, domain, taboo) {
                                Ok(records) => records.into_iter().map(Ok).collect(),
                                Err(violation) => vec![Err(violation)],
                            };
                        for message in messages {
                            if sender.send(message).is_err() {
                                return;
                            }
                        }
                    }
                });
            }
            drop(sender);

            let mut outcome = Ok(());
            for message in receiver.iter() {
                match message {
                    Ok(record) => {
                        collector.add(record);
                    }
                    Err(violation) => {
                        outcome = Err(violation);
                        break;
                    }
                }
            }
            drop(receiver);
            outcome
        })
    }
}

fn domain_records(
    index: &dyn SpanIndex,
    domain: &DomainQueries,
    taboo: &TabooSpans,
) -> Result<Vec<CandidateRecord>, ConsistencyViolation> {
    let mut records = Vec::new();
    for composite in domain.queries() {
        let field = composite.kind.field();
        let pass = Pass {
            query: &composite.query,
            field,
            weight: composite.kind.weight(),
            domain: domain.domain(),
            extraction_type: composite.kind.extraction_type(),
            highlight: &composite.highlight,
            taboo: (field == Field::Content).then_some(taboo),
        };
        records.extend(run(index, &pass)?);
    }
    Ok(records)
}

fn taboo_spans(index: &dyn SpanIndex, taboo: &Query) -> TabooSpans {
    let mut spans = TabooSpans::new();
    match index.search(taboo, Field::Content) {
        Ok(hits) => {
            for hit in hits {
                spans.entry(hit.doc).or_default().push((hit.start, hit.end));
            }
        }
        Err(e) => tracing::error!(query = %taboo, error = %e, "error running taboo query"),
    }
    spans
}

/// Execute one pass and build a record for every hit that survives.
///
/// A hit starting inside the previous hit of the same document and ending no later than it
/// is skipped.
fn run(
    index: &dyn SpanIndex,
    pass: &Pass<'_>,
) -> Result<Vec<CandidateRecord>, ConsistencyViolation> {
    let hits = match index.search(pass.query, pass.field) {
        Ok(hits) => hits,
        Err(e) => {
            tracing::error!(query = %pass.query, error = %e, "error running query");
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::new();
    let mut current_doc = None;
    let mut previous: Option<HitSpan> = None;
    let mut document_id = 0;
    let mut title = String::new();
    let mut title_words = BTreeSet::new();

    for hit in hits {
        if current_doc != Some(hit.doc) {
            current_doc = Some(hit.doc);
            previous = None;
            document_id = parse_document_id(index.document_id(hit.doc).unwrap_or_default());
            title = index
                .field_text(hit.doc, Field::TitleOriginal)
                .map(|tokens| tokens.join(" "))
                .unwrap_or_default();
            title_words = excerpt::title_words(&title);
        } else if let Some(previous) = previous {
            let inside = hit.start >= previous.start && hit.start < previous.end;
            if inside && hit.end <= previous.end {
                continue;
            }
        }
        previous = Some(hit);

        let words = match pass.extraction_type {
            ExtractionType::Override => Vec::new(),
            ExtractionType::Content | ExtractionType::Title => {
                let words = excerpt_words(index, pass, hit)?;
                if words.is_empty() {
                    continue;
                }
                words
            }
        };

        records.push(CandidateRecord {
            doc: hit.doc,
            document_id,
            domain: pass.domain.to_string(),
            extraction_type: pass.extraction_type,
            start: hit.start,
            end: hit.end,
            weight: pass.weight,
            words,
            title: title.clone(),
            title_words: title_words.clone(),
        });
    }
    Ok(records)
}

/// The sentence around `hit`, highlighted; empty when a taboo phrase lies inside it.
fn excerpt_words(
    index: &dyn SpanIndex,
    pass: &Pass<'_>,
    hit: HitSpan,
) -> Result<Vec<String>, ConsistencyViolation> {
    let field = match pass.extraction_type {
        ExtractionType::Title => Field::TitleOriginal,
        _ => Field::ContentOriginal,
    };
    let tokens = index.field_text(hit.doc, field).unwrap_or_default();
    if hit.end > tokens.len() || hit.start >= hit.end {
        return Err(ConsistencyViolation(format!(
            "span {}..{} lies outside field {} of document {} ({} tokens)",
            hit.start,
            hit.end,
            field,
            hit.doc,
            tokens.len()
        )));
    }

    let (start, end) = excerpt::sentence_bounds(tokens, hit.start, hit.end);
    let vetoed = pass
        .taboo
        .and_then(|taboo| taboo.get(&hit.doc))
        .is_some_and(|spans| excerpt::contains_taboo(spans, start, end));
    if vetoed {
        tracing::debug!(doc = hit.doc, start, end, "excerpt contains a taboo phrase");
        return Ok(Vec::new());
    }

    let mut words = tokens[start..end].to_vec();
    excerpt::highlight(&mut words, pass.highlight);
    Ok(words)
}
