//! Scored, rendered output records

use crate::sentex::extraction::ExtractionType;
use crate::sentex::normalization::Highlight;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalRecord {
    pub document_id: u64,
    pub domain: String,
    pub extraction_type: ExtractionType,
    pub start: usize,
    pub end: usize,
    /// Normalized score in `[0, 1]`; above 0.5 is positive
    pub score: f64,
    /// Score before quote averaging, 0.0 when averaging did not change it
    pub original_score: f64,
    pub title: String,
    pub quote: String,
    pub annotated_quote: String,
    pub highlights: Vec<Highlight>,
    pub amplified: bool,
    pub overridden: bool,
}

impl FinalRecord {
    pub fn is_positive(&self) -> bool {
        self.score > 0.5
    }
}

/// One tab-separated output line.
impl fmt::Display for FinalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{:?}\t{}\t{}\t{}\t{}\t{}\t{}\t{:?}",
            self.document_id,
            self.score,
            self.domain,
            self.title,
            self.quote,
            self.annotated_quote,
            self.amplified,
            self.overridden,
            self.original_score
        )
    }
}

/// Merge records of one domain that share a quote.
///
/// The first record of each group stands for it; its score becomes the group average and,
/// when that changes it, the old score is kept as the original score. Groups keep the
/// order in which they first appear.
pub fn group_by_quote(records: Vec<FinalRecord>) -> Vec<FinalRecord> {
    let mut positions: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<Vec<FinalRecord>> = Vec::new();
    for record in records {
        let key = (record.domain.clone(), record.quote.clone());
        match positions.get(&key) {
            Some(&at) => groups[at].push(record),
            None => {
                positions.insert(key, groups.len());
                groups.push(vec![record]);
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|group| {
            let total: f64 = group.iter().map(|record| record.score).sum();
            let average = total / group.len() as f64;
            let mut representative = group.into_iter().next()?;
            if representative.score != average {
                representative.original_score = representative.score;
                representative.score = average;
            }
            Some(representative)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentex::testing::final_record;

    #[test]
    fn renders_tab_separated_line() {
        let mut record = final_record(12, "staff", "Very rude staff.", 0.25);
        record.title = "Never again".to_string();
        record.annotated_quote = "Very <B>rude</B> staff.".to_string();
        record.overridden = true;
        assert_eq!(
            record.to_string(),
            "12\t0.25\tstaff\tNever again\tVery rude staff.\tVery <B>rude</B> staff.\tfalse\ttrue\t0.0"
        );
    }

    #[test]
    fn whole_scores_keep_a_decimal_point() {
        let record = final_record(3, "value", "Worth it.", 1.0);
        assert!(record.to_string().starts_with("3\t1.0\tvalue\t"));
    }

    #[test]
    fn shared_quotes_are_averaged() {
        let grouped = group_by_quote(vec![
            final_record(1, "staff", "Nice staff.", 1.0),
            final_record(2, "value", "Nice staff.", 0.25),
            final_record(3, "staff", "Nice staff.", 0.5),
        ]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].document_id, 1);
        assert_eq!(grouped[0].score, 0.75);
        assert_eq!(grouped[0].original_score, 1.0);
        assert_eq!(grouped[1].domain, "value");
        assert_eq!(grouped[1].original_score, 0.0);
    }

    #[test]
    fn grouping_is_idempotent() {
        let once = group_by_quote(vec![
            final_record(1, "staff", "Nice staff.", 1.0),
            final_record(2, "staff", "Nice staff.", 0.0),
            final_record(3, "staff", "Rude staff.", 0.25),
        ]);
        let twice = group_by_quote(once.clone());
        assert_eq!(once, twice);
    }
}
