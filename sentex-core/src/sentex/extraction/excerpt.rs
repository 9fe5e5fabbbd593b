//! Excerpt reconstruction and highlighting

use crate::sentex::normalization::{HIGHLIGHT_END, HIGHLIGHT_START, SENTENCE_BOUNDARY};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());

/// Never highlighted, even when they are vocabulary terms.
const OUTPUT_STOP_WORDS: [&str; 11] = [
    "hi", "please", "a", "the", "of", "my", "our", "is", "was", "were", "been",
];

/// Ignored when collecting title words.
const TITLE_STOP_WORDS: [&str; 33] = [
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is",
    "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Widen a hit to its enclosing sentence: from just after the previous boundary token to
/// just before the next one.
pub fn sentence_bounds(tokens: &[String], start: usize, end: usize) -> (usize, usize) {
    let start = start.min(tokens.len());
    let sentence_start = tokens[..start]
        .iter()
        .rposition(|token| token == SENTENCE_BOUNDARY)
        .map_or(0, |at| at + 1);
    let sentence_start = match tokens.get(start) {
        Some(token) if token == SENTENCE_BOUNDARY => start + 1,
        _ => sentence_start,
    };
    let end = end.min(tokens.len());
    let sentence_end = tokens[end..]
        .iter()
        .position(|token| token == SENTENCE_BOUNDARY)
        .map_or(tokens.len(), |at| end + at);
    (sentence_start.min(sentence_end), sentence_end)
}

/// True when some taboo span lies entirely within `[start, end)`.
pub fn contains_taboo(taboo: &[(usize, usize)], start: usize, end: usize) -> bool {
    taboo
        .iter()
        .any(|&(taboo_start, taboo_end)| taboo_start >= start && taboo_end <= end)
}

/// Wrap every word whose lowercase form is in `terms` in the highlight sentinels.
pub fn highlight(words: &mut [String], terms: &BTreeSet<String>) {
    if terms.is_empty() {
        return;
    }
    for word in words.iter_mut() {
        let lower = word.to_lowercase();
        if terms.contains(&lower) && !OUTPUT_STOP_WORDS.contains(&lower.as_str()) {
            *word = format!("{}{}{}", HIGHLIGHT_START, word, HIGHLIGHT_END);
        }
    }
}

/// Lowercased title words, split on non-word characters, stop words removed.
pub fn title_words(title: &str) -> BTreeSet<String> {
    NON_WORD
        .split(title)
        .map(str::to_lowercase)
        .filter(|word| !word.is_empty() && !TITLE_STOP_WORDS.contains(&word.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split(' ').map(str::to_string).collect()
    }

    #[test]
    fn widens_hits_to_their_sentence() {
        let tokens = tokens("We loved it . UTSB The room was clean . UTSB Bye UTSB");
        assert_eq!(sentence_bounds(&tokens, 6, 9), (5, 10));
        assert_eq!(sentence_bounds(&tokens, 0, 2), (0, 4));
        assert_eq!(sentence_bounds(&tokens, 11, 12), (11, 12));
    }

    #[test]
    fn fields_without_boundaries_are_taken_whole() {
        let title = tokens("Clean rooms , rude staff");
        assert_eq!(sentence_bounds(&title, 3, 5), (0, 5));
    }

    #[test]
    fn taboo_spans_must_be_fully_inside() {
        let taboo = [(5, 6)];
        assert!(contains_taboo(&taboo, 0, 7));
        assert!(!contains_taboo(&taboo, 0, 5));
        assert!(!contains_taboo(&[], 0, 7));
    }

    #[test]
    fn highlights_terms_but_not_stop_words() {
        let mut words = tokens("The room was Clean and tidy");
        let terms: BTreeSet<String> = ["clean", "the", "tidy"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        highlight(&mut words, &terms);
        assert_eq!(
            words.join(" "),
            "The room was \u{0}Clean\u{1} and \u{0}tidy\u{1}"
        );
    }

    #[test]
    fn title_words_drop_stop_words() {
        let words: Vec<String> = title_words("Not the Best-Value hotel, in town!")
            .into_iter()
            .collect();
        assert_eq!(words, vec!["best", "hotel", "town", "value"]);
    }
}
