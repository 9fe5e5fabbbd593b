//! The vocabulary DSL
//!
//!     A vocabulary directory holds one file per sentiment domain plus a few global lists.
//!     Domain files are line oriented:
//!
//!         # comments run to the end of the line
//!         INCLUDE PLUS_ONE,MINUS_ONE FROM base
//!         FEATURES
//!             room,rooms,bathroom
//!             "front desk"
//!         PLUS_ONE OVERRIDE
//!             CLEAN,spotless
//!             &2 well kept
//!
//!     Unindented lines declare the label that following indented expressions belong to.
//!     Expressions are compiled into [`Query`](crate::sentex::query::Query) trees by
//!     [`expression`], whole files by [`domain`], and the global negation, taboo,
//!     hard-override and substitution lists by [`globals`]. Files are read through a
//!     [`VocabularySource`], so tests can compile vocabularies held in memory.

pub mod domain;
pub mod expression;
pub mod globals;
pub mod source;
pub mod tokens;

pub use domain::{DomainVocabulary, Label, VocabularyCompiler};
pub use expression::{compile_expression, ExpressionError};
pub use globals::GlobalVocabulary;
pub use source::{DirectorySource, MemorySource, VocabularySource};
