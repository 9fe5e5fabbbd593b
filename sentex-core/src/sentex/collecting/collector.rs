use crate::sentex::collecting::final_record::{group_by_quote, FinalRecord};
use crate::sentex::extraction::{CandidateRecord, ExtractionType};
use crate::sentex::normalization::Normalizer;
use crate::sentex::settings::{RenderLimits, ScoringSettings};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct Collected {
    record: CandidateRecord,
    score: f64,
    amplified: bool,
    overridden: bool,
}

impl Collected {
    fn new(record: CandidateRecord) -> Self {
        Self {
            score: record.weight,
            record,
            amplified: false,
            overridden: false,
        }
    }

    fn override_score(&mut self, score: f64) {
        self.score = score;
        self.overridden = true;
    }

    /// Scale by the share of title words that also occur in the excerpt.
    fn amplify(&mut self, title_weight: f64) {
        let title_words = &self.record.title_words;
        if title_words.is_empty() {
            return;
        }
        let excerpt_words: BTreeSet<String> = self
            .record
            .words
            .iter()
            .map(|word| word.to_lowercase())
            .collect();
        let shared = excerpt_words
            .iter()
            .filter(|word| title_words.contains(*word))
            .count();
        if shared > 0 {
            self.score *= title_weight * shared as f64 / title_words.len() as f64;
            self.amplified = true;
        }
    }
}

/// Merges candidate records as they arrive.
#[derive(Debug, Default)]
pub struct RecordCollector {
    records: BTreeMap<String, Collected>,
}

impl RecordCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, returning whether it was kept.
    pub fn add(&mut self, record: CandidateRecord) -> bool {
        let key = record.key();
        let prefix = format!("{} {} ", record.domain, record.doc);
        let mut replaced = Vec::new();
        for (existing_key, existing) in self
            .records
            .range(prefix.clone()..)
            .take_while(|(existing_key, _)| existing_key.starts_with(&prefix))
        {
            let existing = &existing.record;
            if !record.same_group(existing) {
                continue;
            }
            if record.contains(existing)
                || (record.start < existing.start
                    && record.end > existing.start
                    && existing.weight > 0.0
                    && record.weight < 0.0)
            {
                replaced.push(existing_key.clone());
            } else if record.overlaps(existing) {
                return false;
            }
        }

        for existing_key in &replaced {
            self.records.remove(existing_key);
        }
        tracing::debug!(
            key = %key,
            replaced = replaced.len(),
            words = %record.words.join(" "),
            "added hit"
        );
        self.records.insert(key, Collected::new(record));
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Kept records in key order.
    pub fn records(&self) -> impl Iterator<Item = &CandidateRecord> {
        self.records.values().map(|collected| &collected.record)
    }

    /// Freeze the collected records together with what finalization needs.
    pub fn into_record_set(
        self,
        normalizer: Normalizer,
        scoring: &ScoringSettings,
        limits: &RenderLimits,
    ) -> RecordSet {
        RecordSet {
            records: self.records,
            normalizer,
            title_weight: scoring.title_weight,
            limits: limits.clone(),
        }
    }
}

/// The outcome of one extraction pass.
#[derive(Debug, Clone)]
pub struct RecordSet {
    records: BTreeMap<String, Collected>,
    normalizer: Normalizer,
    title_weight: f64,
    limits: RenderLimits,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Collected records in key order, before finalization.
    pub fn candidates(&self) -> impl Iterator<Item = &CandidateRecord> {
        self.records.values().map(|collected| &collected.record)
    }

    /// Apply title overrides, amplify, normalize, render and merge shared quotes.
    pub fn final_records(&self) -> Vec<FinalRecord> {
        let mut records = self.records.clone();
        apply_title_overrides(&mut records);

        let weight = self.title_weight;
        let rendered = records
            .into_values()
            .map(|mut collected| {
                collected.amplify(weight);
                let score = ((collected.score + weight) / (2.0 * weight)).clamp(0.0, 1.0);
                self.render(collected, score)
            })
            .collect();
        group_by_quote(rendered)
    }

    fn render(&self, collected: Collected, score: f64) -> FinalRecord {
        let record = collected.record;
        let excerpt = self
            .normalizer
            .render(&record.words, &record.title, &self.limits);
        FinalRecord {
            document_id: record.document_id,
            domain: record.domain,
            extraction_type: record.extraction_type,
            start: record.start,
            end: record.end,
            score,
            original_score: 0.0,
            title: excerpt.title,
            quote: excerpt.quote,
            annotated_quote: excerpt.annotated_quote,
            highlights: excerpt.highlights,
            amplified: collected.amplified,
            overridden: collected.overridden,
        }
    }
}

/// Let override and title records rewrite the scores of their document, then drop them.
///
/// Records are visited in key order, so override records (empty domain) act first.
fn apply_title_overrides(records: &mut BTreeMap<String, Collected>) {
    let keys: Vec<String> = records.keys().cloned().collect();
    for key in keys {
        let Some(current) = records.get(&key) else {
            continue;
        };
        let doc = current.record.doc;
        let title_score = current.score;
        let title_domain = current.record.domain.clone();
        let kind = current.record.extraction_type;
        match kind {
            ExtractionType::Content => continue,
            ExtractionType::Override => {
                for (other_key, other) in records.iter_mut() {
                    if *other_key != key && other.record.doc == doc {
                        other.override_score(-1.0);
                        tracing::debug!(key = %other_key, "hard override");
                    }
                }
            }
            ExtractionType::Title => {
                for (other_key, other) in records.iter_mut() {
                    if *other_key != key
                        && other.record.doc == doc
                        && other.record.domain == title_domain
                        && title_score * other.score < 0.0
                    {
                        let flipped = -other.score;
                        other.override_score(flipped);
                        tracing::debug!(
                            key = %other_key,
                            score = flipped,
                            "override by title score"
                        );
                    }
                }
            }
        }
        records.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentex::testing::candidate;

    fn collect(records: Vec<CandidateRecord>) -> RecordCollector {
        let mut collector = RecordCollector::new();
        for record in records {
            collector.add(record);
        }
        collector
    }

    fn ranges(collector: &RecordCollector) -> Vec<(usize, usize, f64)> {
        collector
            .records()
            .map(|record| (record.start, record.end, record.weight))
            .collect()
    }

    fn finalize(collector: RecordCollector) -> Vec<FinalRecord> {
        collector
            .into_record_set(
                Normalizer::default(),
                &ScoringSettings::default(),
                &RenderLimits::default(),
            )
            .final_records()
    }

    #[test]
    fn longer_record_replaces_contained_one() {
        let collector = collect(vec![
            candidate(0, "staff", 4, 6, 1.0),
            candidate(0, "staff", 2, 9, 1.0),
        ]);
        assert_eq!(ranges(&collector), vec![(2, 9, 1.0)]);
    }

    #[test]
    fn contained_or_partially_overlapping_record_is_discarded() {
        let mut collector = collect(vec![candidate(0, "staff", 2, 9, 1.0)]);
        assert!(!collector.add(candidate(0, "staff", 4, 6, -1.0)));
        assert!(!collector.add(candidate(0, "staff", 5, 12, 1.0)));
        assert_eq!(ranges(&collector), vec![(2, 9, 1.0)]);
    }

    #[test]
    fn earlier_negative_wins_over_positive() {
        let collector = collect(vec![
            candidate(0, "staff", 4, 8, 1.0),
            candidate(0, "staff", 2, 6, -1.0),
        ]);
        assert_eq!(ranges(&collector), vec![(2, 6, -1.0)]);
    }

    #[test]
    fn later_positive_does_not_displace_negative() {
        let collector = collect(vec![
            candidate(0, "staff", 4, 8, -1.0),
            candidate(0, "staff", 2, 6, 1.0),
        ]);
        assert_eq!(ranges(&collector), vec![(4, 8, -1.0)]);
    }

    #[test]
    fn groups_do_not_interact() {
        let mut title = candidate(0, "staff", 0, 3, 1.0);
        title.extraction_type = ExtractionType::Title;
        let collector = collect(vec![
            candidate(0, "staff", 2, 9, 1.0),
            candidate(0, "value", 4, 6, 1.0),
            candidate(1, "staff", 4, 6, 1.0),
            candidate(0, "staff", 12, 15, -1.0),
            title,
        ]);
        assert_eq!(collector.len(), 5);
    }

    #[test]
    fn documents_sharing_an_id_are_kept_apart() {
        let mut first = candidate(0, "staff", 2, 9, 1.0);
        let mut second = candidate(1, "staff", 2, 9, 1.0);
        let mut nested = candidate(1, "staff", 3, 5, 1.0);
        first.document_id = 0;
        second.document_id = 0;
        nested.document_id = 0;
        let mut collector = RecordCollector::new();
        assert!(collector.add(first));
        assert!(collector.add(second));
        assert!(!collector.add(nested));
        let docs: Vec<usize> = collector.records().map(|record| record.doc).collect();
        assert_eq!(docs, vec![0, 1]);
    }

    #[test]
    fn title_score_flips_only_contradicting_records() {
        let mut title = candidate(0, "staff", 0, 2, 1.0);
        title.extraction_type = ExtractionType::Title;
        let collector = collect(vec![
            title,
            candidate(0, "staff", 3, 6, -1.0),
            candidate(0, "staff", 8, 11, 1.0),
            candidate(0, "value", 13, 16, -1.0),
            candidate(1, "staff", 3, 6, -1.0),
        ]);
        let finals = finalize(collector);
        let scores: Vec<(u64, &str, usize, f64, bool)> = finals
            .iter()
            .map(|r| (r.document_id, r.domain.as_str(), r.start, r.score, r.overridden))
            .collect();
        assert_eq!(
            scores,
            vec![
                (0, "staff", 3, 0.75, true),
                (0, "staff", 8, 0.75, false),
                (1, "staff", 3, 0.25, false),
                (0, "value", 13, 0.25, false),
            ]
        );
    }

    #[test]
    fn hard_override_forces_every_record_of_the_document_negative() {
        let mut hard = candidate(0, "", 0, 2, -1.0);
        hard.extraction_type = ExtractionType::Override;
        let collector = collect(vec![
            hard,
            candidate(0, "staff", 3, 6, 1.0),
            candidate(0, "value", 8, 11, 1.0),
            candidate(1, "value", 8, 11, 1.0),
        ]);
        let finals = finalize(collector);
        assert_eq!(finals.len(), 3);
        assert!(finals.iter().all(|r| r.extraction_type == ExtractionType::Content));
        let forced: Vec<(u64, f64, bool)> = finals
            .iter()
            .map(|r| (r.document_id, r.score, r.overridden))
            .collect();
        assert_eq!(
            forced,
            vec![(0, 0.25, true), (0, 0.25, true), (1, 0.75, false)]
        );
    }

    #[test]
    fn title_words_amplify_scores() {
        let mut record = candidate(0, "staff", 0, 4, 1.0);
        record.words = vec!["Friendly".into(), "staff".into(), "here".into(), ".".into()];
        record.title_words = ["friendly", "staff", "hotel", "view"]
            .iter()
            .map(|word| word.to_string())
            .collect();
        let finals = finalize(collect(vec![record]));
        // 1.0 * 2.0 * 2 / 4 = 1.0, normalized to 0.75
        assert_eq!(finals[0].score, 0.75);
        assert!(finals[0].amplified);
        assert_eq!(finals[0].quote, "Friendly staff here.");
    }

    #[test]
    fn fully_matching_title_doubles_the_score() {
        let mut record = candidate(0, "staff", 0, 2, -1.0);
        record.words = vec!["rude".into(), "staff".into()];
        record.title_words = ["rude", "staff"].iter().map(|w| w.to_string()).collect();
        let finals = finalize(collect(vec![record]));
        assert_eq!(finals[0].score, 0.0);
        assert!(finals[0].amplified);
    }

    #[test]
    fn final_records_can_be_taken_twice() {
        let set = collect(vec![
            candidate(0, "staff", 3, 6, -1.0),
            candidate(2, "staff", 3, 6, 1.0),
        ])
        .into_record_set(
            Normalizer::default(),
            &ScoringSettings::default(),
            &RenderLimits::default(),
        );
        assert_eq!(set.final_records(), set.final_records());
        assert_eq!(set.len(), 2);
    }
}
