//! Per-domain aggregate scores
//!
//! Every final record votes for its domain: +1 when positive (score above 0.5), -1 when
//! negative (below 0.5), nothing when neutral. A domain with fewer records than the
//! minimum evidence scores 0; otherwise the net vote is capped at ±[`MAX_ASSESSMENT`].

use crate::sentex::collecting::FinalRecord;
use crate::sentex::settings::AssessmentSettings;
use std::collections::BTreeMap;

pub const MAX_ASSESSMENT: i32 = 100;

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    count: usize,
    total: i32,
}

/// Aggregate score of each of `domains` over `records`.
pub fn assess<S: AsRef<str>>(
    records: &[FinalRecord],
    domains: &[S],
    settings: &AssessmentSettings,
) -> BTreeMap<String, i32> {
    let mut tallies: BTreeMap<String, Tally> = domains
        .iter()
        .map(|domain| (domain.as_ref().to_string(), Tally::default()))
        .collect();

    for record in records {
        let Some(tally) = tallies.get_mut(&record.domain) else {
            continue;
        };
        tally.count += 1;
        if record.score > 0.5 {
            tally.total += 1;
        } else if record.score < 0.5 {
            tally.total -= 1;
        }
    }

    tallies
        .into_iter()
        .map(|(domain, tally)| {
            let score = if tally.count < settings.min_evidence {
                0
            } else {
                tally.total.clamp(-MAX_ASSESSMENT, MAX_ASSESSMENT)
            };
            tracing::debug!(domain = %domain, count = tally.count, score, "assessed domain");
            (domain, score)
        })
        .collect()
}
