//! Parallel retrieval tests with in-process sources.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use paper_survey::error::{ClientError, SourceUnavailable};
use paper_survey::models::{Paper, SourceKind};
use paper_survey::retrieval::ParallelRetriever;
use paper_survey::sources::PaperSource;

/// Source that answers after a delay with fixed papers, or fails.
struct StaticSource {
    kind: SourceKind,
    titles: Option<Vec<&'static str>>,
    delay: Duration,
}

impl StaticSource {
    fn ok(kind: SourceKind, titles: Vec<&'static str>) -> Arc<dyn PaperSource> {
        Arc::new(Self { kind, titles: Some(titles), delay: Duration::ZERO })
    }

    fn slow(kind: SourceKind, titles: Vec<&'static str>, delay: Duration) -> Arc<dyn PaperSource> {
        Arc::new(Self { kind, titles: Some(titles), delay })
    }

    fn failing(kind: SourceKind) -> Arc<dyn PaperSource> {
        Arc::new(Self { kind, titles: None, delay: Duration::ZERO })
    }
}

#[async_trait]
impl PaperSource for StaticSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Paper>, SourceUnavailable> {
        tokio::time::sleep(self.delay).await;
        let Some(titles) = &self.titles else {
            return Err(SourceUnavailable::new(self.kind, ClientError::server(503, "down")));
        };
        Ok(titles
            .iter()
            .take(max_results)
            .map(|t| Paper::new(format!("{}:{query}:{t}", self.kind.as_str()), *t, self.kind))
            .collect())
    }
}

#[tokio::test]
async fn test_retrieve_merges_sources_in_order() {
    let retriever = ParallelRetriever::new(vec![
        StaticSource::ok(SourceKind::Arxiv, vec!["a1", "a2"]),
        StaticSource::ok(SourceKind::SemanticScholar, vec!["s1"]),
    ]);

    let report = retriever.retrieve("q", 10).await.unwrap();
    let titles: Vec<_> = report.items.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["a1", "a2", "s1"]);
    assert!(!report.has_failures());
}

#[tokio::test]
async fn test_retrieve_order_ignores_completion_order() {
    let retriever = ParallelRetriever::new(vec![
        StaticSource::slow(SourceKind::Arxiv, vec!["slow"], Duration::from_millis(100)),
        StaticSource::ok(SourceKind::SemanticScholar, vec!["fast"]),
    ]);

    let report = retriever.retrieve("q", 10).await.unwrap();
    assert_eq!(report.items[0].title, "slow");
    assert_eq!(report.items[1].title, "fast");
}

#[tokio::test]
async fn test_retrieve_runs_sources_concurrently() {
    let retriever = ParallelRetriever::new(vec![
        StaticSource::slow(SourceKind::Arxiv, vec!["a"], Duration::from_millis(200)),
        StaticSource::slow(SourceKind::SemanticScholar, vec!["s"], Duration::from_millis(200)),
    ]);

    let started = Instant::now();
    let report = retriever.retrieve("q", 10).await.unwrap();
    assert_eq!(report.items.len(), 2);
    assert!(started.elapsed() < Duration::from_millis(390), "sources ran sequentially");
}

#[tokio::test]
async fn test_partial_failure_keeps_other_source() {
    let retriever = ParallelRetriever::new(vec![
        StaticSource::failing(SourceKind::Arxiv),
        StaticSource::ok(SourceKind::SemanticScholar, vec!["s1", "s2"]),
    ]);

    let report = retriever.retrieve("q", 10).await.unwrap();
    assert_eq!(report.items.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, SourceKind::Arxiv);
    assert!(report.failures[0].is_transient());
}

#[tokio::test]
async fn test_empty_source_is_not_a_failure() {
    let retriever = ParallelRetriever::new(vec![
        StaticSource::ok(SourceKind::Arxiv, vec![]),
        StaticSource::failing(SourceKind::SemanticScholar),
    ]);

    let report = retriever.retrieve("q", 10).await.unwrap();
    assert!(report.items.is_empty());
    assert_eq!(report.failures.len(), 1);
}

#[tokio::test]
async fn test_all_sources_failing_is_an_error() {
    let retriever = ParallelRetriever::new(vec![
        StaticSource::failing(SourceKind::Arxiv),
        StaticSource::failing(SourceKind::SemanticScholar),
    ]);

    let err = retriever.retrieve("q", 10).await.unwrap_err();
    assert_eq!(err.failures.len(), 2);
    assert_eq!(err.failures[0].kind, SourceKind::Arxiv);
    assert_eq!(err.failures[1].kind, SourceKind::SemanticScholar);
}

#[tokio::test]
async fn test_no_sources_is_an_error() {
    let retriever = ParallelRetriever::new(Vec::new());
    assert_eq!(retriever.source_count(), 0);

    let err = retriever.retrieve("q", 10).await.unwrap_err();
    assert!(err.failures.is_empty());
    assert!(err.to_string().contains("no sources configured"));
}

#[tokio::test]
async fn test_per_source_limit_passed_through() {
    let retriever =
        ParallelRetriever::new(vec![StaticSource::ok(SourceKind::Arxiv, vec!["a", "b", "c"])]);

    let report = retriever.retrieve("q", 2).await.unwrap();
    assert_eq!(report.items.len(), 2);
}

#[tokio::test]
async fn test_retrieve_batch_keeps_query_order() {
    let retriever =
        ParallelRetriever::new(vec![StaticSource::ok(SourceKind::SemanticScholar, vec!["t"])]);

    let queries = vec!["first".to_string(), "second".to_string(), "third".to_string()];
    let results = retriever.retrieve_batch(&queries, 5).await;

    let order: Vec<_> = results.iter().map(|(q, _)| q.as_str()).collect();
    assert_eq!(order, vec!["first", "second", "third"]);
    assert_eq!(results[1].1[0].id, "semantic_scholar:second:t");
}

#[tokio::test]
async fn test_retrieve_batch_failed_query_yields_empty() {
    let retriever = ParallelRetriever::new(vec![StaticSource::failing(SourceKind::Arxiv)]);

    let results = retriever.retrieve_batch(&["q".to_string()], 5).await;
    assert_eq!(results.len(), 1);
    assert!(results[0].1.is_empty());
}
