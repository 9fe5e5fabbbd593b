//! Extraction
//!
//!     The extraction driver runs every query of a batch against a span index and turns
//!     the surviving hits into candidate records:
//!
//!         1. hard overrides, against titles          -> override records (weight -1)
//!         2. taboo phrases, when polite              -> spans that veto excerpts
//!         3. per domain, in parallel:
//!              positive, negative                    -> content records (weight +1 / -1)
//!              title positive, title negative        -> title records
//!
//!     A content hit is widened to its sentence and its query terms that are words of
//!     interest are highlighted. Records flow into a
//!     [`RecordCollector`](crate::sentex::collecting::RecordCollector), which decides what
//!     survives.

pub mod composite;
pub mod driver;
pub mod excerpt;
pub mod record;

pub use composite::{CompositeQuery, DomainQueries, QueryKind};
pub use driver::Extractor;
pub use record::{CandidateRecord, ExtractionType};
