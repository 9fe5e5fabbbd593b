//! Rule-based sentence breaking
//!
//! A run of `.`, `?` and `!` followed by whitespace (or the end of the text) is a break
//! candidate. Runs containing `?` or `!` always break. A run of periods only breaks when
//! the next character is not a lowercase letter, so "etc. you" stays in one sentence.
//! A candidate is never taken when the sentence would end on a known abbreviation.

/// Lowercase abbreviations that do not end a sentence.
pub const ABBREVIATIONS: [&str; 14] = [
    "capt.", "col.", "dr.", "etc.", "gen.", "gov.", "lt.", "mr.", "mrs.", "mt.", "prof.", "rev.",
    "sgt.", "vs.",
];

pub fn is_abbreviation(word: &str) -> bool {
    let lower = word.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '?' | '!')
}

fn ends_with_abbreviation(sentence: &str) -> bool {
    sentence
        .rsplit(' ')
        .next()
        .is_some_and(is_abbreviation)
}

/// Split `text` into trimmed, non-empty sentences.
pub fn split(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if !is_terminator(chars[i].1) {
            i += 1;
            continue;
        }

        let mut run_end = i;
        let mut strong = false;
        while run_end < chars.len() && is_terminator(chars[run_end].1) {
            strong |= chars[run_end].1 != '.';
            run_end += 1;
        }
        let mut next = run_end;
        while next < chars.len() && chars[next].1.is_whitespace() {
            next += 1;
        }
        i = run_end;

        let at_end = next == chars.len();
        if next == run_end && !at_end {
            continue;
        }
        if !(at_end || strong || !chars[next].1.is_lowercase()) {
            continue;
        }

        let end = chars.get(run_end).map_or(text.len(), |(at, _)| *at);
        let sentence = text[start..end].trim();
        if ends_with_abbreviation(sentence) && !at_end {
            continue;
        }
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = end;
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}
