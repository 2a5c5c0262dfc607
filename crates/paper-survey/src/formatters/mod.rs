//! Output formatting for survey results.

pub mod json;
pub mod markdown;

pub use json::{compact_paper, format_outcome_json};
pub use markdown::{format_bibliography, format_survey_markdown};
