//! One-stop entry point: vocabulary in, scored excerpts out
//!
//!     let analyzer = SentimentAnalyzer::load(&DirectorySource::new("vocab"), &domains, &settings)?;
//!     let records = analyzer.analyze(&documents)?.final_records();
//!     let scores = analyzer.assess(&records);
//!
//! Global lists must compile; a domain that fails is reported and left out, so one broken
//! vocabulary file does not take the others down.

use crate::sentex::assessing;
use crate::sentex::collecting::{FinalRecord, RecordSet};
use crate::sentex::document::Document;
use crate::sentex::error::{AnalysisError, ConsistencyViolation, VocabularyError};
use crate::sentex::extraction::Extractor;
use crate::sentex::index::MemoryIndex;
use crate::sentex::normalization::Normalizer;
use crate::sentex::settings::Settings;
use crate::sentex::vocabulary::{
    DomainVocabulary, GlobalVocabulary, VocabularyCompiler, VocabularySource,
};
use std::collections::BTreeMap;

/// A domain that could not be compiled, with the reason.
#[derive(Debug)]
pub struct UnavailableDomain {
    pub domain: String,
    pub error: VocabularyError,
}

#[derive(Debug)]
pub struct SentimentAnalyzer {
    vocabularies: Vec<DomainVocabulary>,
    unavailable: Vec<UnavailableDomain>,
    normalizer: Normalizer,
    extractor: Extractor,
    settings: Settings,
}

impl SentimentAnalyzer {
    pub fn load<S: AsRef<str>>(
        source: &dyn VocabularySource,
        domains: &[S],
        settings: &Settings,
    ) -> Result<Self, AnalysisError> {
        let globals = GlobalVocabulary::load(source, &settings.compiler)?;
        let compiler = VocabularyCompiler::new(source, &settings.compiler);

        let mut vocabularies = Vec::new();
        let mut unavailable = Vec::new();
        for domain in domains {
            let domain = domain.as_ref();
            match compiler.compile_domain(domain) {
                Ok(vocabulary) => vocabularies.push(vocabulary),
                Err(error) => {
                    tracing::error!(domain, error = %error, "domain unavailable");
                    unavailable.push(UnavailableDomain {
                        domain: domain.to_lowercase(),
                        error,
                    });
                }
            }
        }

        let extractor = Extractor::new(&vocabularies, &globals, settings);
        tracing::info!(
            domains = vocabularies.len(),
            unavailable = unavailable.len(),
            "vocabulary loaded"
        );
        Ok(Self {
            vocabularies,
            unavailable,
            normalizer: Normalizer::new(globals.substitutions().to_vec()),
            extractor,
            settings: settings.clone(),
        })
    }

    /// Names of the domains that compiled, in request order.
    pub fn domains(&self) -> Vec<&str> {
        self.vocabularies
            .iter()
            .map(DomainVocabulary::domain)
            .collect()
    }

    pub fn vocabularies(&self) -> &[DomainVocabulary] {
        &self.vocabularies
    }

    pub fn unavailable(&self) -> &[UnavailableDomain] {
        &self.unavailable
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Index one batch of documents and extract its records.
    pub fn analyze(&self, documents: &[Document]) -> Result<RecordSet, ConsistencyViolation> {
        let prepared = documents
            .iter()
            .map(|document| self.normalizer.prepare(document))
            .collect();
        let index = MemoryIndex::build(prepared, self.settings.extraction.span_limit);
        self.extractor.extract(&index, &self.normalizer)
    }

    /// Aggregate scores of every available domain.
    pub fn assess(&self, records: &[FinalRecord]) -> BTreeMap<String, i32> {
        assessing::assess(records, &self.domains(), &self.settings.assessment)
    }

    /// Analyze a batch and aggregate its final records over `domains`.
    pub fn assess_batch<S: AsRef<str>>(
        &self,
        documents: &[Document],
        domains: &[S],
    ) -> Result<BTreeMap<String, i32>, ConsistencyViolation> {
        let records = self.analyze(documents)?.final_records();
        Ok(assessing::assess(&records, domains, &self.settings.assessment))
    }
}
