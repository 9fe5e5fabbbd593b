//! Record collection and finalization
//!
//!     Candidate records arrive from the extraction driver one at a time. The
//!     [`RecordCollector`] keeps at most one record per overlapping region of a
//!     (document, domain, extraction type) group:
//!
//!         new contains old                          old is replaced
//!         new is negative, starts before a
//!           positive old and overlaps it            old is replaced
//!         no overlap                                both are kept
//!         anything else                             new is discarded
//!
//!     Once extraction is done the collector becomes a [`RecordSet`], whose
//!     [`final_records`](RecordSet::final_records) applies title overrides, title-word
//!     amplification and score normalization, renders the excerpts and merges records
//!     that ended up with the same quote.

pub mod collector;
pub mod final_record;

pub use collector::{RecordCollector, RecordSet};
pub use final_record::{group_by_quote, FinalRecord};
