//! PDF download stage.
//!
//! Lookup order for each paper: in-memory map (which also coalesces
//! concurrent requests for the same key), then the persistent cache, then the
//! network. Downloads are bounded by a semaphore; excess requests queue.

pub mod cache;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use moka::future::Cache;
use reqwest::header::HeaderMap;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

pub use cache::{ContentCache, DiskCache, MemoryCache};

use crate::client::{Download, HttpClient};
use crate::config::Config;
use crate::error::{ConfigError, FetchError};
use crate::models::{CacheKey, ContentRef, EntryKind, FetchedPaper, ItemFailure, Paper, StageReport};

/// In-memory references kept per fetcher.
const MEMORY_CAPACITY: u64 = 10_000;

/// Bounded-concurrency PDF downloader backed by a [`ContentCache`].
#[derive(Clone)]
pub struct PdfFetcher {
    http: HttpClient,
    cache: Arc<dyn ContentCache>,
    memory: Cache<CacheKey, ContentRef>,
    permits: Arc<Semaphore>,
}

impl PdfFetcher {
    /// Create a fetcher with the configured download limit and timeout.
    pub fn new(config: &Config, cache: Arc<dyn ContentCache>) -> Result<Self, ConfigError> {
        let http = HttpClient::new(config, HeaderMap::new(), config.pdf_timeout, Duration::ZERO)?;
        Ok(Self {
            http,
            cache,
            memory: Cache::builder().max_capacity(MEMORY_CAPACITY).build(),
            permits: Arc::new(Semaphore::new(config.max_concurrent_downloads)),
        })
    }

    /// The persistent cache behind this fetcher.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn ContentCache> {
        &self.cache
    }

    /// Fetch every paper's PDF.
    ///
    /// Returns one item per input paper, in input order; papers whose download
    /// failed carry no reference and a matching entry in `failures`.
    #[instrument(skip_all, fields(papers = papers.len()))]
    pub async fn fetch_all(&self, papers: Vec<Paper>) -> StageReport<FetchedPaper> {
        let results = join_all(papers.iter().map(|paper| self.fetch_one(paper))).await;

        let mut report = StageReport::new();
        for (paper, result) in papers.into_iter().zip(results) {
            let pdf = match result {
                Ok(content) => Some(content),
                Err(e) => {
                    warn!(paper_id = %paper.id, error = %e, "PDF unavailable");
                    report.failures.push(ItemFailure::new(paper.id.clone(), e));
                    None
                }
            };
            report.items.push(FetchedPaper { paper, pdf });
        }

        let fetched = report.items.iter().filter(|f| f.pdf.is_some()).count();
        info!(fetched, total = report.items.len(), "Fetch stage complete");
        report
    }

    /// Fetch one paper's PDF, sharing work with concurrent calls for the same key.
    pub async fn fetch_one(&self, paper: &Paper) -> Result<ContentRef, Arc<FetchError>> {
        let Some(url) = paper.pdf_url.as_deref() else {
            return Err(Arc::new(FetchError::NoPdfUrl));
        };
        let key = CacheKey::for_paper(paper);

        self.memory
            .try_get_with(key.clone(), async {
                if let Some(hit) = self.cache.lookup(&key, EntryKind::Pdf).await? {
                    debug!(paper_id = %paper.id, "PDF cache hit");
                    return Ok(hit);
                }

                let download = {
                    let _permit = self.permits.acquire().await.map_err(|_| FetchError::Closed)?;
                    debug!(paper_id = %paper.id, url, "Downloading PDF");
                    self.http.get_bytes(url).await?
                };
                check_pdf(&download)?;

                let stored = self.cache.store(&key, EntryKind::Pdf, &download.bytes).await?;
                info!(paper_id = %paper.id, bytes = download.bytes.len(), "Downloaded PDF");
                Ok::<_, FetchError>(stored)
            })
            .await
    }
}

impl std::fmt::Debug for PdfFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfFetcher")
            .field("available_permits", &self.permits.available_permits())
            .finish()
    }
}

/// Accept PDF and octet-stream responses; sniff the magic bytes when untyped.
fn check_pdf(download: &Download) -> Result<(), FetchError> {
    match download.content_type.as_deref().map(str::to_ascii_lowercase) {
        Some(ct) if ct.contains("pdf") || ct.contains("octet-stream") => Ok(()),
        Some(ct) => Err(FetchError::NotPdf { content_type: ct }),
        None if download.bytes.starts_with(b"%PDF") => Ok(()),
        None => Err(FetchError::NotPdf { content_type: "unknown".to_string() }),
    }
}
