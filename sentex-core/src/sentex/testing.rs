//! Testing utilities
//!
//!     Review text is easy to get subtly wrong: a stray comma moves a sentence boundary,
//!     a different spelling misses a vocabulary entry. Tests therefore work from two
//!     fixed sources:
//!
//!         1. The bundled vocabulary (`sentex-core/vocab`), via [`bundled_vocabulary`]
//!         2. Record factories ([`candidate`], [`final_record`]) for collector and
//!            scoring tests that don't need real text at all
//!
//!     Factory records carry words that are unique per (document, start, end), so their
//!     rendered quotes never merge by accident.

use crate::sentex::collecting::FinalRecord;
use crate::sentex::extraction::{CandidateRecord, ExtractionType};
use crate::sentex::vocabulary::MemorySource;
use std::collections::BTreeSet;

/// Domains shipped in `sentex-core/vocab`.
pub const BUNDLED_DOMAINS: [&str; 5] = ["overall", "cleanliness", "staff", "value", "family"];

const BUNDLED_FILES: [(&str, &str); 10] = [
    ("negation.txt", include_str!("../../vocab/negation.txt")),
    (
        "hard_overrides.txt",
        include_str!("../../vocab/hard_overrides.txt"),
    ),
    ("taboo.txt", include_str!("../../vocab/taboo.txt")),
    (
        "substitutions.txt",
        include_str!("../../vocab/substitutions.txt"),
    ),
    ("base.vocab", include_str!("../../vocab/base.vocab")),
    ("overall.vocab", include_str!("../../vocab/overall.vocab")),
    (
        "cleanliness.vocab",
        include_str!("../../vocab/cleanliness.vocab"),
    ),
    ("staff.vocab", include_str!("../../vocab/staff.vocab")),
    ("value.vocab", include_str!("../../vocab/value.vocab")),
    ("family.vocab", include_str!("../../vocab/family.vocab")),
];

/// The bundled vocabulary as an in-memory source.
pub fn bundled_vocabulary() -> MemorySource {
    let mut source = MemorySource::new();
    for (resource, text) in BUNDLED_FILES {
        source.insert(resource, text);
    }
    source
}

/// A positive or negative content record of `doc` (whose id is `doc` too).
pub fn candidate(doc: usize, domain: &str, start: usize, end: usize, weight: f64) -> CandidateRecord {
    CandidateRecord {
        doc,
        document_id: doc as u64,
        domain: domain.to_string(),
        extraction_type: ExtractionType::Content,
        start,
        end,
        weight,
        words: vec![
            format!("doc{}", doc),
            format!("from{}", start),
            format!("to{}", end),
        ],
        title: String::new(),
        title_words: BTreeSet::new(),
    }
}

/// A rendered content record with no title and no annotations.
pub fn final_record(document_id: u64, domain: &str, quote: &str, score: f64) -> FinalRecord {
    FinalRecord {
        document_id,
        domain: domain.to_string(),
        extraction_type: ExtractionType::Content,
        start: 0,
        end: 0,
        score,
        original_score: 0.0,
        title: String::new(),
        quote: quote.to_string(),
        annotated_quote: quote.to_string(),
        highlights: Vec::new(),
        amplified: false,
        overridden: false,
    }
}
