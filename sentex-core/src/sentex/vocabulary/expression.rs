//! Compiling one expression line into a query tree
//!
//!     word            single term, case-folded; ALL-CAPS words are also words of interest
//!     @NUMERAL        macro, expands to a pattern matching numeral-tagged tokens
//!     a,b,"c d"       disjunction; quoted alternatives are compiled as sub-expressions
//!     "c d"           quoted sub-expression
//!     a b c           chained near, default window, in order
//!     &N / ~N         window N for the rest of the chain, ordered / unordered
//!
//! Whitespace around commas is removed before tokenizing, so `a , b` is the same
//! disjunction as `a,b`.

use crate::sentex::normalization::NUMERAL_MARKER;
use crate::sentex::query::{Query, TermPattern};
use crate::sentex::vocabulary::tokens::{tokenize, ExprToken};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use thiserror::Error;

static COMMA_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*").unwrap());

/// Why an expression could not be compiled. The caller adds file and line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ExpressionError(pub String);

type Token<'s> = (ExprToken, &'s str);

/// Compile an expression, registering ALL-CAPS literals into `interest` when given.
pub fn compile_expression(
    expression: &str,
    near_window: usize,
    mut interest: Option<&mut BTreeSet<String>>,
) -> Result<Query, ExpressionError> {
    let normalized = COMMA_SPACING.replace_all(expression.trim(), ",");
    let tokens = tokenize(&normalized)
        .map_err(|_| ExpressionError(format!("Uneven quotes in '{}'", expression.trim())))?;

    let mut window = near_window;
    let mut in_order = true;
    let mut chain: Option<Query> = None;

    for group in tokens
        .split(|(kind, _)| *kind == ExprToken::Whitespace)
        .filter(|group| !group.is_empty())
    {
        if let [(ExprToken::Window, directive)] = group {
            (window, in_order) = parse_window(directive)?;
            continue;
        }
        let term = compile_term(group, near_window, interest.as_deref_mut())?;
        chain = Some(match chain.take() {
            None => term,
            Some(previous) => Query::near(vec![previous, term], window, in_order),
        });
    }

    chain.ok_or_else(|| ExpressionError("Empty expression".to_string()))
}

fn parse_window(directive: &str) -> Result<(usize, bool), ExpressionError> {
    let in_order = directive.starts_with('&');
    let value = &directive[1..];
    if value.is_empty() {
        return Err(ExpressionError("No value set for window".to_string()));
    }
    let window = value
        .parse::<usize>()
        .map_err(|_| ExpressionError(format!("Invalid window value '{}'", value)))?;
    Ok((window, in_order))
}

fn compile_term(
    group: &[Token<'_>],
    near_window: usize,
    mut interest: Option<&mut BTreeSet<String>>,
) -> Result<Query, ExpressionError> {
    if !group.iter().any(|(kind, _)| *kind == ExprToken::Comma) {
        return match group {
            [single] => compile_atom(single, near_window, interest),
            _ => Err(malformed(group)),
        };
    }

    let mut alternatives = Vec::new();
    for item in group.split(|(kind, _)| *kind == ExprToken::Comma) {
        let query = match item {
            [] => return Err(ExpressionError("Expected term after comma".to_string())),
            [single] => compile_atom(single, near_window, interest.as_deref_mut())?,
            _ => return Err(malformed(item)),
        };
        alternatives.push(query);
    }
    Ok(Query::Or(alternatives))
}

fn compile_atom(
    &(kind, text): &Token<'_>,
    near_window: usize,
    interest: Option<&mut BTreeSet<String>>,
) -> Result<Query, ExpressionError> {
    match kind {
        ExprToken::Quoted => compile_expression(&text[1..text.len() - 1], near_window, interest),
        ExprToken::Word => compile_word(text, interest),
        ExprToken::Window => Err(ExpressionError(format!(
            "Window directive '{}' must stand alone",
            text
        ))),
        ExprToken::Comma | ExprToken::Whitespace => Err(malformed(&[(kind, text)])),
    }
}

fn compile_word(
    word: &str,
    interest: Option<&mut BTreeSet<String>>,
) -> Result<Query, ExpressionError> {
    if word.starts_with('@') {
        return expand_macro(word);
    }
    let folded = word.to_lowercase();
    if is_all_caps(word) {
        if let Some(interest) = interest {
            interest.insert(folded.clone());
        }
    }
    Ok(Query::Term(folded))
}

fn expand_macro(name: &str) -> Result<Query, ExpressionError> {
    match name.to_uppercase().as_str() {
        "@NUMERAL" => TermPattern::new(&format!("{}.+", NUMERAL_MARKER))
            .map(Query::Pattern)
            .map_err(|e| ExpressionError(e.to_string())),
        _ => Err(ExpressionError(format!("Unknown macro '{}'", name))),
    }
}

fn is_all_caps(word: &str) -> bool {
    word.chars().any(char::is_alphabetic) && !word.chars().any(char::is_lowercase)
}

fn malformed(tokens: &[Token<'_>]) -> ExpressionError {
    let text: String = tokens.iter().map(|(_, text)| *text).collect();
    ExpressionError(format!("Malformed term '{}'", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(expression: &str) -> Result<Query, ExpressionError> {
        compile_expression(expression, 1, None)
    }

    fn term(text: &str) -> Query {
        Query::term(text)
    }

    #[test]
    fn single_word_is_lowercased() {
        assert_eq!(compile("Clean").unwrap(), term("clean"));
    }

    #[test]
    fn words_chain_into_ordered_near() {
        let query = compile("well kept room").unwrap();
        let expected = Query::near(
            vec![
                Query::near(vec![term("well"), term("kept")], 1, true),
                term("room"),
            ],
            1,
            true,
        );
        assert_eq!(query, expected);
    }

    #[test]
    fn window_directive_applies_to_rest_of_chain() {
        let query = compile("view ~3 ocean").unwrap();
        assert_eq!(
            query,
            Query::near(vec![term("view"), term("ocean")], 3, false)
        );
        let query = compile("&2 walking distance").unwrap();
        assert_eq!(
            query,
            Query::near(vec![term("walking"), term("distance")], 2, true)
        );
    }

    #[test]
    fn commas_build_disjunctions() {
        let query = compile("room , rooms,suite").unwrap();
        assert_eq!(
            query,
            Query::Or(vec![term("room"), term("rooms"), term("suite")])
        );
    }

    #[test]
    fn quoted_alternatives_are_sub_expressions() {
        let query = compile(r#"desk,"front desk""#).unwrap();
        assert_eq!(
            query,
            Query::Or(vec![
                term("desk"),
                Query::near(vec![term("front"), term("desk")], 1, true),
            ])
        );
    }

    #[test]
    fn numeral_macro_expands_to_pattern() {
        let query = compile("@NUMERAL stars").unwrap();
        let Query::Near { clauses, .. } = query else {
            panic!("expected near, got {query:?}");
        };
        let Query::Pattern(pattern) = &clauses[0] else {
            panic!("expected pattern");
        };
        assert!(pattern.matches("utnum4"));
    }

    #[test]
    fn all_caps_words_become_words_of_interest() {
        let mut interest = BTreeSet::new();
        compile_expression("SPOTLESS,clean,A+", 1, Some(&mut interest)).unwrap();
        let words: Vec<&str> = interest.iter().map(String::as_str).collect();
        assert_eq!(words, vec!["a+", "spotless"]);
    }

    #[test]
    fn errors() {
        assert_eq!(
            compile(r#"clean "room"#).unwrap_err().0,
            r#"Uneven quotes in 'clean "room'"#
        );
        assert_eq!(
            compile("& room").unwrap_err().0,
            "No value set for window"
        );
        assert_eq!(
            compile("~x room").unwrap_err().0,
            "Invalid window value 'x'"
        );
        assert_eq!(
            compile("@PRICE").unwrap_err().0,
            "Unknown macro '@PRICE'"
        );
        assert_eq!(
            compile("a,,b").unwrap_err().0,
            "Expected term after comma"
        );
        assert_eq!(compile("   ").unwrap_err().0, "Empty expression");
    }
}
