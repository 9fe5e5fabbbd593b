//! Candidate records produced by the extraction driver

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Where a candidate record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionType {
    /// A sentence of the body
    Content,
    /// The whole title, matched by a domain's title queries
    Title,
    /// A hard-override phrase in the title
    Override,
}

impl ExtractionType {
    pub fn name(self) -> &'static str {
        match self {
            ExtractionType::Content => "content",
            ExtractionType::Title => "title",
            ExtractionType::Override => "override",
        }
    }
}

impl fmt::Display for ExtractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One surviving query hit, before merging and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    /// Ordinal of the source document within its batch
    pub doc: usize,
    pub document_id: u64,
    /// Empty for override records, which apply to every domain
    pub domain: String,
    pub extraction_type: ExtractionType,
    pub start: usize,
    pub end: usize,
    /// +1.0 or -1.0
    pub weight: f64,
    /// Excerpt tokens, highlighted words wrapped in the highlight sentinels
    pub words: Vec<String>,
    /// Normalized title text
    pub title: String,
    /// Lowercased non-stop words of the title
    pub title_words: BTreeSet<String>,
}

impl CandidateRecord {
    /// Collector key; sorts by domain, batch ordinal and start offset.
    ///
    /// The ordinal rather than the document id keeps documents with repeated or
    /// unparsable ids apart.
    pub fn key(&self) -> String {
        format!(
            "{} {} {:03} {} {:?} {}",
            self.domain,
            self.doc,
            self.start,
            self.end,
            self.weight,
            self.extraction_type
        )
    }

    /// Same document, domain and extraction type.
    pub fn same_group(&self, other: &CandidateRecord) -> bool {
        self.doc == other.doc
            && self.extraction_type == other.extraction_type
            && self.domain == other.domain
    }

    pub fn contains(&self, other: &CandidateRecord) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    pub fn overlaps(&self, other: &CandidateRecord) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentex::testing::candidate;

    #[test]
    fn keys_sort_by_start_offset() {
        let early = candidate(0, "staff", 7, 20, 1.0);
        let late = candidate(0, "staff", 120, 130, -1.0);
        assert_eq!(early.key(), "staff 0 007 20 1.0 content");
        assert_eq!(late.key(), "staff 0 120 130 -1.0 content");
        assert!(early.key() < late.key());
    }

    #[test]
    fn keys_use_the_batch_ordinal() {
        let mut first = candidate(0, "staff", 2, 4, 1.0);
        let mut second = candidate(1, "staff", 2, 4, 1.0);
        first.document_id = 42;
        second.document_id = 42;
        assert_eq!(first.key(), "staff 0 002 4 1.0 content");
        assert_eq!(second.key(), "staff 1 002 4 1.0 content");
    }

    #[test]
    fn containment_and_overlap() {
        let outer = candidate(0, "value", 2, 9, 1.0);
        let inner = candidate(0, "value", 3, 5, 1.0);
        let after = candidate(0, "value", 9, 12, 1.0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.overlaps(&inner));
        assert!(!outer.overlaps(&after));
    }
}
