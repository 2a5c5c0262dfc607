//! Semantic Scholar Graph API client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{info, instrument, warn};

use super::{PaperSource, map_records, request_size};
use crate::client::HttpClient;
use crate::config::Config;
use crate::error::{ClientError, ConfigError, SourceUnavailable};
use crate::models::semantic_scholar::{S2Paper, S2SearchResponse, SEARCH_FIELDS};
use crate::models::{Paper, RawRecord, SourceKind};

/// Client for `/paper/search`.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    http: HttpClient,
    graph_api_url: String,
    require_pdf: bool,
}

impl SemanticScholarSource {
    /// Create a client; the API key, if any, is sent as `x-api-key`.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(ref key) = config.s2_api_key {
            let value = HeaderValue::from_str(key).map_err(|e| ConfigError::Env {
                var: "SEMANTIC_SCHOLAR_API_KEY",
                message: e.to_string(),
            })?;
            headers.insert("x-api-key", value);
        }

        let http = HttpClient::new(
            config,
            headers,
            config.request_timeout,
            config.s2_request_interval,
        )?;
        Ok(Self {
            http,
            graph_api_url: config.graph_api_url.clone(),
            require_pdf: config.require_pdf,
        })
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<Paper>, ClientError> {
        let url = format!("{}/paper/search", self.graph_api_url);
        let params = vec![
            ("query".to_string(), query.to_string()),
            ("limit".to_string(), request_size(max_results, self.require_pdf).to_string()),
            ("fields".to_string(), SEARCH_FIELDS.join(",")),
        ];

        let response: S2SearchResponse = self.http.get_json(&url, &params).await?;

        let records = response.data.into_iter().filter_map(|value| {
            match serde_json::from_value::<S2Paper>(value) {
                Ok(paper) => Some(RawRecord::SemanticScholar(paper)),
                Err(e) => {
                    warn!(source = "semantic_scholar", error = %e, "Dropped undecodable record");
                    None
                }
            }
        });
        Ok(map_records(SourceKind::SemanticScholar, records, max_results, self.require_pdf))
    }
}

#[async_trait]
impl PaperSource for SemanticScholarSource {
    fn kind(&self) -> SourceKind {
        SourceKind::SemanticScholar
    }

    #[instrument(skip(self), fields(source = "semantic_scholar"))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Paper>, SourceUnavailable> {
        let papers = self
            .fetch(query, max_results)
            .await
            .map_err(|e| SourceUnavailable::new(SourceKind::SemanticScholar, e))?;
        info!(count = papers.len(), "Semantic Scholar search complete");
        Ok(papers)
    }
}
