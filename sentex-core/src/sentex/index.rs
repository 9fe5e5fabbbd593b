//! Span index capability
//!
//!     The extraction driver never looks at raw text directly. It asks a [`SpanIndex`] for
//!     the spans a query matches in one field of every document, and for the token
//!     sequences it needs to rebuild excerpts. Two fields are searchable ([`Field::Content`]
//!     and [`Field::Title`], both lowercased and punctuation-marked); their `*Original`
//!     counterparts hold the normalized tokens at the same positions, for display only.
//!
//!     [`MemoryIndex`] is the reference implementation used for every batch.

pub mod memory;

use crate::sentex::error::QueryError;
use crate::sentex::query::Query;
use std::fmt;

pub use memory::MemoryIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Content,
    Title,
    ContentOriginal,
    TitleOriginal,
}

impl Field {
    pub fn is_searchable(self) -> bool {
        matches!(self, Field::Content | Field::Title)
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Content => "content",
            Field::Title => "title",
            Field::ContentOriginal => "content_original",
            Field::TitleOriginal => "title_original",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A matched token range `[start, end)` of one field of document `doc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HitSpan {
    pub doc: usize,
    pub start: usize,
    pub end: usize,
}

impl HitSpan {
    pub fn new(doc: usize, start: usize, end: usize) -> Self {
        Self { doc, start, end }
    }
}

/// Read-only access to a batch of prepared documents.
pub trait SpanIndex: Send + Sync {
    fn document_count(&self) -> usize;

    /// Id of the document at ordinal `doc`.
    fn document_id(&self, doc: usize) -> Option<&str>;

    /// Token sequence of one field of one document.
    fn field_text(&self, doc: usize, field: Field) -> Option<&[String]>;

    /// Spans of `query` in `field`, ascending by `(doc, start, end)`.
    fn search<'a>(
        &'a self,
        query: &Query,
        field: Field,
    ) -> Result<Box<dyn Iterator<Item = HitSpan> + 'a>, QueryError>;
}
