//! Running counts of extracted records per domain

use crate::sentex::collecting::FinalRecord;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DomainCounts {
    pub positive: usize,
    pub other: usize,
}

impl DomainCounts {
    pub fn total(&self) -> usize {
        self.positive + self.other
    }
}

/// Positive and non-positive final records per domain, over any number of batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionStatistics {
    domains: BTreeMap<String, DomainCounts>,
    documents: usize,
}

impl ExtractionStatistics {
    pub fn new<S: AsRef<str>>(domains: &[S]) -> Self {
        Self {
            domains: domains
                .iter()
                .map(|domain| (domain.as_ref().to_string(), DomainCounts::default()))
                .collect(),
            documents: 0,
        }
    }

    /// Count the records of one batch of `documents` documents. Records of domains
    /// outside the tracked list are ignored.
    pub fn record(&mut self, documents: usize, records: &[FinalRecord]) {
        self.documents += documents;
        for record in records {
            let Some(counts) = self.domains.get_mut(&record.domain) else {
                continue;
            };
            if record.is_positive() {
                counts.positive += 1;
            } else {
                counts.other += 1;
            }
        }
    }

    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn counts(&self, domain: &str) -> Option<DomainCounts> {
        self.domains.get(domain).copied()
    }
}

impl fmt::Display for ExtractionStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .domains
            .keys()
            .map(String::len)
            .chain(["domain".len()])
            .max()
            .unwrap_or_default();
        writeln!(f, "{} documents", self.documents)?;
        write!(
            f,
            "{:<width$} {:>8} {:>8} {:>8}",
            "domain",
            "positive",
            "other",
            "total",
            width = width
        )?;
        for (domain, counts) in &self.domains {
            write!(
                f,
                "\n{:<width$} {:>8} {:>8} {:>8}",
                domain,
                counts.positive,
                counts.other,
                counts.total(),
                width = width
            )?;
        }
        Ok(())
    }
}
