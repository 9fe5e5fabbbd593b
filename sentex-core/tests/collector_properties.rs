//! Properties of record collection and finalization over arbitrary candidate streams.

use proptest::prelude::*;
use sentex_core::sentex::collecting::{group_by_quote, RecordCollector};
use sentex_core::sentex::extraction::{CandidateRecord, ExtractionType};
use sentex_core::sentex::normalization::Normalizer;
use sentex_core::sentex::settings::{RenderLimits, ScoringSettings};
use sentex_core::sentex::testing::candidate;

fn candidate_strategy() -> impl Strategy<Value = CandidateRecord> {
    (
        0usize..3,
        prop::sample::select(vec!["staff", "value"]),
        0usize..30,
        1usize..8,
        any::<bool>(),
        prop::sample::select(vec![
            ExtractionType::Content,
            ExtractionType::Content,
            ExtractionType::Title,
            ExtractionType::Override,
        ]),
    )
        .prop_map(|(doc, domain, start, length, positive, kind)| {
            let weight = if positive { 1.0 } else { -1.0 };
            let domain = if kind == ExtractionType::Override { "" } else { domain };
            let mut record = candidate(doc, domain, start, start + length, weight);
            record.extraction_type = kind;
            record
        })
}

fn collect(records: Vec<CandidateRecord>) -> RecordCollector {
    let mut collector = RecordCollector::new();
    for record in records {
        collector.add(record);
    }
    collector
}

proptest! {
    #[test]
    fn kept_records_never_overlap_within_a_group(
        records in prop::collection::vec(candidate_strategy(), 0..40)
    ) {
        let collector = collect(records);
        let kept: Vec<&CandidateRecord> = collector.records().collect();
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                prop_assert!(!(a.same_group(b) && a.overlaps(b)), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn final_scores_stay_in_unit_range(
        records in prop::collection::vec(candidate_strategy(), 0..40)
    ) {
        let finals = collect(records)
            .into_record_set(
                Normalizer::default(),
                &ScoringSettings::default(),
                &RenderLimits::default(),
            )
            .final_records();
        for record in &finals {
            prop_assert!((0.0..=1.0).contains(&record.score));
            prop_assert_eq!(record.extraction_type, ExtractionType::Content);
        }
        prop_assert_eq!(group_by_quote(finals.clone()), finals);
    }
}
