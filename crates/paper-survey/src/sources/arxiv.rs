//! arXiv Atom API client.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::{info, instrument};

use super::{PaperSource, map_records, request_size};
use crate::client::HttpClient;
use crate::config::Config;
use crate::error::{ClientError, ConfigError, SourceUnavailable};
use crate::models::arxiv::parse_feed;
use crate::models::{Paper, RawRecord, SourceKind};

/// Client for the arXiv query API.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    http: HttpClient,
    api_url: String,
    require_pdf: bool,
}

impl ArxivSource {
    /// Create a client spaced by the configured arXiv request interval.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let http = HttpClient::new(
            config,
            HeaderMap::new(),
            config.request_timeout,
            config.arxiv_request_interval,
        )?;
        Ok(Self { http, api_url: config.arxiv_api_url.clone(), require_pdf: config.require_pdf })
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<Paper>, ClientError> {
        let params = vec![
            ("search_query".to_string(), query.to_string()),
            ("start".to_string(), "0".to_string()),
            ("max_results".to_string(), request_size(max_results, self.require_pdf).to_string()),
            ("sortBy".to_string(), "relevance".to_string()),
            ("sortOrder".to_string(), "descending".to_string()),
        ];

        let body = self.http.get_text(&self.api_url, &params).await?;
        let feed = parse_feed(&body)?;

        // arXiv reports query errors as a single entry with HTTP 200
        if let Some(error) = feed.entries.iter().find(|e| e.is_api_error()) {
            let message = error.summary.clone().unwrap_or_default();
            return Err(ClientError::bad_request(message.trim()));
        }

        let records = feed.entries.into_iter().map(RawRecord::Arxiv);
        Ok(map_records(SourceKind::Arxiv, records, max_results, self.require_pdf))
    }
}

#[async_trait]
impl PaperSource for ArxivSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Arxiv
    }

    #[instrument(skip(self), fields(source = "arxiv"))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Paper>, SourceUnavailable> {
        let papers = self
            .fetch(query, max_results)
            .await
            .map_err(|e| SourceUnavailable::new(SourceKind::Arxiv, e))?;
        info!(count = papers.len(), "arXiv search complete");
        Ok(papers)
    }
}
