//! Text normalization
//!
//!     Matching works on token positions, so body and title text are first brought into a
//!     canonical, whitespace-tokenizable form (see [`forward`]): markup and entities are
//!     resolved, punctuation and brackets become tokens of their own, every sentence ends
//!     with the boundary token `UTSB`, and numbers carry the `UTNUM` prefix.
//!
//!     The inverse direction (see [`inverse`]) turns a run of canonical tokens back into
//!     display text, and [`render`] converts highlight sentinels into `<B>` markup while
//!     keeping every output within its length cap.
//!
//!     [`Normalizer::prepare`] produces the per-field token sequences a span index needs.

pub mod entities;
pub mod forward;
pub mod inverse;
pub mod render;
pub mod sentences;

use crate::sentex::document::Document;
use crate::sentex::settings::RenderLimits;
use once_cell::sync::Lazy;
use regex::Regex;

pub use render::{Highlight, RenderedExcerpt};

/// Token appended after every sentence.
pub const SENTENCE_BOUNDARY: &str = "UTSB";
/// Prefix of number-like tokens.
pub const NUMERAL_MARKER: &str = "UTNUM";
/// Replaces punctuation tokens in searchable fields.
pub const PUNCTUATION_MARKER: &str = "UTPUNCT";
/// Sentinels wrapped around highlighted words until rendering.
pub const HIGHLIGHT_START: char = '\u{0}';
pub const HIGHLIGHT_END: char = '\u{1}';
/// Searchable fields keep at most this many tokens.
pub const MAX_FIELD_TOKENS: usize = 5000;

static PUNCTUATION_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"[.?!,();:][!"#$%&'()*+,\-./:;<=>?@\[\\\]^_`{|}\~]*"##).unwrap()
});

/// The per-field token sequences of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    pub id: String,
    /// Lowercased, punctuation-marked body tokens
    pub content: Vec<String>,
    /// Body tokens as normalized, used to rebuild excerpts
    pub content_original: Vec<String>,
    /// Lowercased, punctuation-marked title tokens
    pub title: Vec<String>,
    /// Title tokens as normalized, without sentence boundaries
    pub title_original: Vec<String>,
}

/// Forward and inverse text transforms, parameterized by the substitution list.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    substitutions: Vec<Regex>,
}

impl Normalizer {
    pub fn new(substitutions: Vec<Regex>) -> Self {
        Self { substitutions }
    }

    /// Raw text to canonical text.
    pub fn normalize(&self, text: &str) -> String {
        forward::normalize(text, &self.substitutions)
    }

    pub fn prepare(&self, document: &Document) -> PreparedDocument {
        let content_original = tokens(&self.normalize(&document.body));
        let title_original: Vec<String> = tokens(&self.normalize(&document.title))
            .into_iter()
            .filter(|token| token != SENTENCE_BOUNDARY)
            .collect();
        PreparedDocument {
            id: document.id.clone(),
            content: searchable(&content_original),
            title: searchable(&title_original),
            content_original,
            title_original,
        }
    }

    /// Canonical tokens back to display text.
    pub fn restore(&self, words: &[String]) -> String {
        inverse::restore(&words.join(" "))
    }

    /// Canonical text back to display text.
    pub fn restore_text(&self, text: &str) -> String {
        inverse::restore(text)
    }

    /// Display quote, annotated quote and title of an excerpt, within `limits`.
    pub fn render(&self, words: &[String], title: &str, limits: &RenderLimits) -> RenderedExcerpt {
        render::render(&self.restore(words), &self.restore_text(title), limits)
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .take(MAX_FIELD_TOKENS)
        .map(str::to_string)
        .collect()
}

fn searchable(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            PUNCTUATION_TOKEN
                .replace_all(&token.to_lowercase(), PUNCTUATION_MARKER)
                .into_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_builds_aligned_fields() {
        let normalizer = Normalizer::default();
        let prepared = normalizer.prepare(&Document::new(
            "7",
            "Great Stay!",
            "Clean rooms, friendly staff.",
        ));
        assert_eq!(
            prepared.content_original,
            vec!["Clean", "rooms", ",", "friendly", "staff", ".", "UTSB"]
        );
        assert_eq!(
            prepared.content,
            vec!["clean", "rooms", "UTPUNCT", "friendly", "staff", "UTPUNCT", "utsb"]
        );
        assert_eq!(prepared.title_original, vec!["Great", "Stay", "!"]);
        assert_eq!(prepared.title, vec!["great", "stay", "UTPUNCT"]);
    }

    #[test]
    fn punctuation_marking_keeps_other_tokens() {
        let marked = searchable(&["...".to_string(), "'s".to_string(), "UTNUM2".to_string()]);
        assert_eq!(marked, vec!["UTPUNCT", "'s", "utnum2"]);
    }

    #[test]
    fn fields_are_capped() {
        let body = "word ".repeat(MAX_FIELD_TOKENS + 10);
        let prepared = Normalizer::default().prepare(&Document::new("1", "", body));
        assert_eq!(prepared.content.len(), MAX_FIELD_TOKENS);
        assert_eq!(prepared.content.len(), prepared.content_original.len());
    }
}
