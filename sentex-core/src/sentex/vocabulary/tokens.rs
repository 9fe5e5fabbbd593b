//! Token definitions for vocabulary expressions
//!
//! An expression line is split into whitespace-separated terms. Quotes protect embedded
//! whitespace, commas build disjunctions and `&N` / `~N` set the window of the chain.
use logos::Logos;

/// All possible tokens of one expression line
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ExprToken {
    // Separates the terms of a chain
    #[regex(r"[ \t]+")]
    Whitespace,

    #[token(",")]
    Comma,

    // Quoted sub-expression, quotes included in the slice
    #[regex(r#""[^"]*""#)]
    Quoted,

    // Window directive: & keeps order, ~ does not
    #[regex(r"[&~][^ \t,]*")]
    Window,

    #[regex(r#"[^ \t,"&~][^ \t,"]*"#)]
    Word,
}

/// Tokenize an expression, returning each token with its source slice.
///
/// The error carries the span that could not be lexed; in practice this is always an
/// unterminated quote.
pub fn tokenize(source: &str) -> Result<Vec<(ExprToken, &str)>, logos::Span> {
    let mut lexer = ExprToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.slice())),
            Err(()) => return Err(lexer.span()),
        }
    }

    Ok(tokens)
}
