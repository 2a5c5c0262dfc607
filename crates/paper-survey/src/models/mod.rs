//! Data models: the canonical paper record, the upstream record formats it is
//! mapped from, and the per-stage result types.

pub mod arxiv;
mod content;
mod paper;
mod record;
mod report;
pub mod semantic_scholar;

pub use content::{CacheKey, ContentRef, EntryKind, FetchedPaper};
pub use paper::{Paper, ProcessedPaper, SourceKind, SummarizedPaper};
pub use record::{RawRecord, RecordRejected};
pub use report::{ItemFailure, StageReport};
