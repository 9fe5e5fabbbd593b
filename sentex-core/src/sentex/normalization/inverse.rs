//! Canonical text back to display text

use crate::sentex::normalization::{entities, NUMERAL_MARKER, SENTENCE_BOUNDARY};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static I_AM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i) i m ").unwrap());
static CONTRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i) (\w+) '?(ve|s|d|re|ll) ").unwrap());
static NEGATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)n '?t ").unwrap());
static NUMBER_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+),\s+(\d+)").unwrap());
static SPACE_BEFORE_CLOSING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s+([!)}\]:;'",>.?\-])"#).unwrap());
static SPACE_BEFORE_RIGHT_BRACKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([)}\]>])").unwrap());
static SPACE_AFTER_OPENING: Lazy<Regex> = Lazy::new(|| Regex::new(r"([(\[{<\-]) ").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").unwrap());
static LEADING_JUNK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[!#%&*+,./:;<=>?@\[\\\]^_`{|}\~ ]+").unwrap());
static TRAILING_JUNK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[#%&*+,/:;<=>@\[\\\]^_`{|}\~ ]+$").unwrap());

/// Display text for canonical `text`: respaced, markup-escaped, markers removed.
pub fn restore(text: &str) -> String {
    let text = entities::escape(&respace(text));
    text.replace(NUMERAL_MARKER, "")
}

/// Undo the spacing introduced by the forward transform.
pub fn respace(text: &str) -> String {
    let mut text = text.to_string();
    if text.contains('(') != text.contains(')') {
        text = text.replace(['(', ')'], "");
    }
    let text = text
        .replace('_', " ")
        .replace(SENTENCE_BOUNDARY, "")
        .replace(" (s)", "(s)");
    let text = I_AM.replace_all(&text, " I'm ").into_owned();
    let text = replace_until_stable(&CONTRACTION, text, " ${1}'${2} ");
    let text = NEGATION
        .replace_all(&text, |caps: &Captures| {
            let joined: String = caps[0].chars().filter(|c| *c != ' ').collect();
            format!("{} ", joined)
        })
        .into_owned();
    let text = replace_until_stable(&NUMBER_COMMA, text, "${1},${2}");
    let text = replace_until_stable(&SPACE_BEFORE_CLOSING, text, "${1}");
    let text = replace_until_stable(&SPACE_BEFORE_RIGHT_BRACKET, text, "${1}");
    let text = replace_until_stable(&SPACE_AFTER_OPENING, text, "${1}");
    let text = MULTI_SPACE
        .replace_all(&text, " ")
        .replace(" i ", " I ")
        .replace("$ ", "$");
    let text = LEADING_JUNK.replace(&text, "");
    let text = TRAILING_JUNK.replace(&text, "");
    text.trim().to_string()
}

fn replace_until_stable(regex: &Regex, mut text: String, replacement: &str) -> String {
    while regex.is_match(&text) {
        text = regex.replace_all(&text, replacement).into_owned();
    }
    text
}
