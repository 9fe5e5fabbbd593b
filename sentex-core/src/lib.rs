//! # sentex
//!
//! Vocabulary-driven sentiment excerpt extraction.
//!
//! File Layout
//!
//! The library follows the shape of a small compiler followed by a matching engine:
//!
//! src/sentex
//!   ├── vocabulary     The vocabulary DSL: tokens, expressions, domain files, global lists
//!   ├── query          Span query trees produced by the vocabulary compiler
//!   ├── normalization  Raw text to canonical tokens, and back to display excerpts
//!   ├── index          The span index capability and the in-memory reference index
//!   ├── extraction     Composite queries and the extraction driver
//!   ├── collecting     Candidate merging, title overrides, scoring and rendering
//!   └── assessing      Per-domain aggregate scores
//!
//! Most callers only need [`sentex::analyzer::SentimentAnalyzer`], which wires the pieces
//! together for one batch of documents.

pub mod sentex;
