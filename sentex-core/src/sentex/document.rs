//! Input documents

use serde::{Deserialize, Serialize};

/// One review (or any other titled text) handed to the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub body: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Parse a document id into the numeric id carried by records.
///
/// Unparsable ids are not fatal: the record is still produced under id 0.
pub fn parse_document_id(id: &str) -> u64 {
    match id.trim().parse::<u64>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(id = %id, "unparsable document id, defaulting to 0");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_ids() {
        assert_eq!(parse_document_id("42"), 42);
        assert_eq!(parse_document_id(" 7 "), 7);
    }

    #[test]
    fn malformed_ids_default_to_zero() {
        assert_eq!(parse_document_id("review-12"), 0);
        assert_eq!(parse_document_id(""), 0);
    }
}
