//! Fuzzing library for paper-survey.
//!
//! Targets cover the two upstream record formats and the title matcher used
//! for deduplication.
//!
//! # Usage
//!
//! ```bash
//! cd crates/survey-fuzz
//! cargo +nightly fuzz run fuzz_arxiv_feed -- -max_total_time=60
//! ```

pub use paper_survey::models;
pub use paper_survey::ranking;
