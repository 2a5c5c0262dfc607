//! Concurrent fan-out of one query to every configured source.

use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{info, instrument, warn};

use crate::error::{AllSourcesFailed, SourceUnavailable};
use crate::models::{Paper, StageReport};
use crate::sources::PaperSource;

/// Queries all sources at once and merges what comes back.
#[derive(Clone)]
pub struct ParallelRetriever {
    sources: Vec<Arc<dyn PaperSource>>,
}

impl ParallelRetriever {
    /// Retriever over the given sources, in priority order.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn PaperSource>>) -> Self {
        Self { sources }
    }

    /// Number of configured sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Search every source concurrently.
    ///
    /// Papers are concatenated in source order regardless of completion order.
    /// Failed sources are reported next to the papers; only a failure of every
    /// source (or having no sources) is an error.
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub async fn retrieve(
        &self,
        query: &str,
        per_source_max: usize,
    ) -> Result<StageReport<Paper, SourceUnavailable>, AllSourcesFailed> {
        let results =
            join_all(self.sources.iter().map(|s| s.search(query, per_source_max))).await;

        let mut report = StageReport::new();
        let mut answered = 0_usize;
        for result in results {
            match result {
                Ok(papers) => {
                    answered += 1;
                    report.items.extend(papers);
                }
                Err(failure) => {
                    warn!(
                        source = %failure.kind,
                        transient = failure.is_transient(),
                        error = %failure.error,
                        "Source failed"
                    );
                    report.failures.push(failure);
                }
            }
        }

        if answered == 0 {
            return Err(AllSourcesFailed { failures: report.failures });
        }

        info!(
            papers = report.items.len(),
            failed_sources = report.failures.len(),
            "Retrieval complete"
        );
        Ok(report)
    }

    /// Run [`retrieve`](Self::retrieve) for several queries concurrently.
    ///
    /// Results follow the input query order. A query whose sources all failed
    /// yields an empty list.
    pub async fn retrieve_batch(
        &self,
        queries: &[String],
        per_source_max: usize,
    ) -> Vec<(String, Vec<Paper>)> {
        let mut pending = FuturesUnordered::new();
        for (index, query) in queries.iter().enumerate() {
            pending.push(async move { (index, self.retrieve(query, per_source_max).await) });
        }

        let mut slots: Vec<Vec<Paper>> = vec![Vec::new(); queries.len()];
        while let Some((index, result)) = pending.next().await {
            match result {
                Ok(report) => slots[index] = report.items,
                Err(e) => warn!(query = %queries[index], error = %e, "Query failed on every source"),
            }
        }

        queries.iter().cloned().zip(slots).collect()
    }
}

impl std::fmt::Debug for ParallelRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<_> = self.sources.iter().map(|s| s.kind()).collect();
        f.debug_struct("ParallelRetriever").field("sources", &kinds).finish()
    }
}
