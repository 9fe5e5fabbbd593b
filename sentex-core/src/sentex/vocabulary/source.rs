//! Where vocabulary files come from

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read access to named vocabulary resources such as `staff.vocab` or `negation.txt`.
pub trait VocabularySource: Send + Sync {
    fn read(&self, resource: &str) -> io::Result<String>;
}

/// Resource name of a domain's vocabulary file.
pub fn domain_resource(domain: &str) -> String {
    format!("{}.vocab", domain)
}

/// Resources stored as files under one root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl VocabularySource for DirectorySource {
    fn read(&self, resource: &str) -> io::Result<String> {
        fs::read_to_string(self.root.join(resource))
    }
}

/// Resources held in memory, keyed by resource name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: &str, text: &str) -> Self {
        self.insert(resource, text);
        self
    }

    pub fn insert(&mut self, resource: &str, text: &str) {
        self.files.insert(resource.to_string(), text.to_string());
    }
}

impl VocabularySource for MemorySource {
    fn read(&self, resource: &str) -> io::Result<String> {
        self.files.get(resource).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no vocabulary resource named {}", resource),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_reports_missing_resources() {
        let source = MemorySource::new().with("staff.vocab", "FEATURES\n    staff\n");
        assert!(source.read("staff.vocab").unwrap().starts_with("FEATURES"));
        let err = source.read("pool.vocab").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn directory_source_reads_shipped_vocabulary() {
        let source = DirectorySource::new(concat!(env!("CARGO_MANIFEST_DIR"), "/vocab"));
        let text = source.read(&domain_resource("overall")).unwrap();
        assert!(text.contains("FEATURES"));
    }
}
