//! Deduplication and ranking of multi-source candidates.
//!
//! Pipeline: cluster duplicates (union-find over id equality and fuzzy title
//! similarity), keep one representative per cluster, score the survivors, then
//! sort with a fully deterministic tie-break.

pub mod cluster;
pub mod scoring;
pub mod similarity;
mod weights;

use std::cmp::Ordering;

use tracing::{debug, info};

pub use cluster::deduplicate;
pub use scoring::{PDF_BONUS, ScoredPaper, extract_keywords};
pub use similarity::{normalize_title, title_similarity};
pub use weights::RankingWeights;

use crate::config::RankingConfig;
use crate::error::ConfigError;
use crate::models::Paper;

/// Deduplicating ranker with validated weights.
#[derive(Debug, Clone)]
pub struct Ranker {
    config: RankingConfig,
}

impl Ranker {
    /// Create a ranker, rejecting invalid weights or thresholds.
    pub fn new(config: RankingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Deduplicate, score and return the best `top_k` papers.
    ///
    /// Empty input gives empty output; `top_k` larger than the number of
    /// distinct papers returns all of them.
    #[must_use]
    pub fn rank(&self, papers: &[Paper], topic: &str, top_k: usize) -> Vec<Paper> {
        self.rank_scored(papers, topic, top_k).into_iter().map(|s| s.paper).collect()
    }

    /// Like [`rank`](Self::rank) but keeps the scoring breakdown.
    #[must_use]
    pub fn rank_scored(&self, papers: &[Paper], topic: &str, top_k: usize) -> Vec<ScoredPaper> {
        if papers.is_empty() {
            return Vec::new();
        }

        let unique = deduplicate(papers, self.config.fuzzy_threshold);
        info!(
            input = papers.len(),
            unique = unique.len(),
            removed = papers.len() - unique.len(),
            "Deduplicated candidates"
        );

        let keywords = extract_keywords(topic);
        let scored = scoring::score_all(unique, &keywords, &self.config.weights);
        for s in &scored {
            debug!(
                paper_id = %s.paper.id,
                relevance = s.relevance,
                citations = s.citations,
                recency = s.recency,
                pdf = s.pdf_bonus,
                score = s.score,
                "Scored candidate"
            );
        }

        select_top_k(scored, top_k)
    }
}

/// Score descending, then citations descending, then id ascending.
fn compare(a: &ScoredPaper, b: &ScoredPaper) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.paper.citations().cmp(&a.paper.citations()))
        .then_with(|| a.paper.id.cmp(&b.paper.id))
}

/// Sort deterministically and keep the first `top_k`.
#[must_use]
pub fn select_top_k(mut scored: Vec<ScoredPaper>, top_k: usize) -> Vec<ScoredPaper> {
    scored.sort_by(compare);
    scored.truncate(top_k);
    scored
}
