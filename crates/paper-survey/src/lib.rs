//! Paper Survey
//!
//! Generates a literature survey for a research topic: searches arXiv and
//! Semantic Scholar in parallel, merges and ranks the candidates, downloads and
//! caches their PDFs, summarizes each paper with a language model and
//! synthesizes a Markdown review.
//!
//! # Features
//!
//! - **Fault-isolated retrieval**: one catalog failing never fails the other
//! - **Deterministic ranking**: union-find title clustering and a total tie-break
//! - **Bounded downloads**: semaphore-limited, de-duplicated in flight, cached on disk
//! - **Rate-limited and retried**: per-catalog request spacing with exponential backoff
//!
//! # Example
//!
//! ```no_run
//! use paper_survey::{config::Config, pipeline::SurveyPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let pipeline = SurveyPipeline::builder(config).build()?;
//!
//!     let outcome = pipeline.run("retrieval-augmented generation").await?;
//!     println!("{}", outcome.survey);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formatters;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod ranking;
pub mod refine;
pub mod retrieval;
pub mod sources;
pub mod summarize;
pub mod synthesize;

pub use config::Config;
pub use error::{ClientError, PipelineError};
pub use models::{Paper, SourceKind};
pub use pipeline::{PipelineBuilder, SurveyOutcome, SurveyPipeline};
