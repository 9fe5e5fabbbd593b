//! Raw text to canonical text
//!
//! The steps run in a fixed order; later steps rely on the spacing produced by earlier
//! ones (sentence breaking needs the capitalization fix, numeral tagging needs detached
//! punctuation, substitutions need collapsed whitespace).

use crate::sentex::normalization::sentences::{self, is_abbreviation};
use crate::sentex::normalization::{
    entities, HIGHLIGHT_END, HIGHLIGHT_START, NUMERAL_MARKER, SENTENCE_BOUNDARY,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?\s*/?>").unwrap());
static CAMEL_CASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z.])([A-Z])").unwrap());
static CONTROL_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\r\t]+").unwrap());
static SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+[!.?]+)(\s+)([a-z])").unwrap());
static ATTACHED_PUNCTUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"([A-Za-z])([!"#$%&'*+,./:;<=>?@\[\\\]^_`{|}\~]+)(\D)"##).unwrap()
});
static BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"[(\[{<)\]}>]").unwrap());
static ATTACHED_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z0-9])-([A-Za-z0-9])").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").unwrap());
static NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b(\d+|(?:one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve",
        r"|(?:thir|four|fif|six|seven|eigh|nine)teen",
        r"|(?:twen|thir|for|fif|six|seven|eigh|nine)ty",
        r"|hundred|thousand|million|billion)\b)",
    ))
    .unwrap()
});

/// Apply the full forward transform.
pub fn normalize(text: &str, substitutions: &[Regex]) -> String {
    let text: String = text
        .chars()
        .filter(|c| *c != HIGHLIGHT_START && *c != HIGHLIGHT_END)
        .collect();

    let text = TAG.replace_all(&text, " ");
    let text = CAMEL_CASE.replace_all(&text, "${1} ${2}");
    let mut text = entities::unescape(&text.replace("&nbsp;", " "));
    text.push(' ');
    let text = text.replace('"', "");
    let text = CONTROL_WHITESPACE.replace_all(&text, " ");
    let text = capitalize_sentence_starts(&text);
    let text = mark_sentences(&text);
    let text = replace_until_stable(&ATTACHED_PUNCTUATION, text, "${1} ${2}${3}");
    let text = BRACKET.replace_all(&text, " ${0} ");
    let text = replace_until_stable(&ATTACHED_DASH, text.into_owned(), "${1} - ${2}");
    let text = text.replace('$', "$ ");
    let text = MULTI_SPACE.replace_all(&text, " ");
    let text = NUMERAL.replace_all(&text, format!("{}${{1}}", NUMERAL_MARKER).as_str());
    let text = join_substituted_phrases(&text, substitutions);

    text.trim().to_string()
}

/// Keep applying `regex` until it no longer matches; used where matches overlap.
fn replace_until_stable(regex: &Regex, mut text: String, replacement: &str) -> String {
    while regex.is_match(&text) {
        text = regex.replace_all(&text, replacement).into_owned();
    }
    text
}

fn capitalize_sentence_starts(text: &str) -> String {
    SENTENCE_START
        .replace_all(text, |caps: &Captures| {
            if is_abbreviation(&caps[1]) {
                caps[0].to_string()
            } else {
                format!("{}{}{}", &caps[1], &caps[2], caps[3].to_uppercase())
            }
        })
        .into_owned()
}

fn mark_sentences(text: &str) -> String {
    let mut marked = String::with_capacity(text.len() + 16);
    for sentence in sentences::split(text) {
        marked.push_str(sentence);
        marked.push(' ');
        marked.push_str(SENTENCE_BOUNDARY);
        marked.push(' ');
    }
    marked
}

/// Underscore the inner spaces of every substitution match, e.g. `not_to_mention`.
///
/// All patterns are matched against the text as it was before any of them applied.
fn join_substituted_phrases(text: &str, substitutions: &[Regex]) -> String {
    if substitutions.is_empty() {
        return text.to_string();
    }
    let mut joined = vec![false; text.len()];
    for pattern in substitutions {
        for found in pattern.find_iter(text) {
            if found.end() > found.start() {
                for flag in &mut joined[found.start()..found.end() - 1] {
                    *flag = true;
                }
            }
        }
    }
    text.char_indices()
        .map(|(at, c)| if c == ' ' && joined[at] { '_' } else { c })
        .collect()
}
