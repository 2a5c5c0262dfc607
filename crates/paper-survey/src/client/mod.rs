//! Shared HTTP client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff for transient failures
//! - Optional request-rate limiting shared by every clone (governor)
//! - Response caching keyed by an MD5 digest of the request

use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use moka::future::Cache;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::debug;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult, ConfigError};

/// Body and content type of a binary download.
#[derive(Debug, Clone)]
pub struct Download {
    /// `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
    /// Response body.
    pub bytes: Vec<u8>,
}

/// HTTP client with retry, rate limiting and a response cache.
#[derive(Clone)]
pub struct HttpClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache for GET text bodies; absent when disabled.
    cache: Option<Cache<String, String>>,

    /// Shared request-rate limiter.
    limiter: Option<Arc<DefaultDirectRateLimiter>>,

    /// Per-request timeout, used for error reporting.
    timeout: Duration,
}

impl HttpClient {
    /// Build a client from the configuration.
    ///
    /// `headers` are sent with every request; `min_interval` spaces requests
    /// (zero disables limiting).
    pub fn new(
        config: &Config,
        headers: HeaderMap,
        timeout: Duration,
        min_interval: Duration,
    ) -> Result<Self, ConfigError> {
        let mut headers = headers;
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ConfigError::HttpClient(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(config.retry_min_backoff, config.retry_max_backoff)
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let cache = (config.cache_max_size > 0 && !config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(config.cache_max_size)
                .time_to_live(config.cache_ttl)
                .build()
        });

        let limiter =
            Quota::with_period(min_interval).map(|quota| Arc::new(RateLimiter::direct(quota)));

        Ok(Self { client, cache, limiter, timeout })
    }

    /// GET a text body, served from the response cache when possible.
    pub async fn get_text(&self, url: &str, params: &[(String, String)]) -> ClientResult<String> {
        let cache_key = cache_key("GET", url, params);
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&cache_key).await {
                debug!(url, "Response cache hit");
                return Ok(cached);
            }
        }

        self.throttle().await;

        let response =
            self.client.get(url).query(params).send().await.map_err(|e| self.classify(e))?;
        let response = handle_response(response).await?;
        let body = response.text().await.map_err(|e| self.classify_reqwest(e))?;

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, body.clone()).await;
        }
        Ok(body)
    }

    /// GET and deserialize a JSON body.
    pub async fn get_json<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = self.get_text(url, params).await?;
        serde_json::from_str(&body).map_err(ClientError::from)
    }

    /// GET a binary body (never cached in memory).
    pub async fn get_bytes(&self, url: &str) -> ClientResult<Download> {
        self.throttle().await;

        let response = self.client.get(url).send().await.map_err(|e| self.classify(e))?;
        let response = handle_response(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| self.classify_reqwest(e))?;

        Ok(Download { content_type, bytes: bytes.to_vec() })
    }

    /// POST a JSON body and deserialize the JSON answer.
    pub async fn post_json<T>(
        &self,
        url: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.throttle().await;

        let body_str = serde_json::to_string(body)?;

        let mut request =
            self.client.post(url).header("Content-Type", "application/json").body(body_str);
        if let Some(key) = bearer {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let response = handle_response(response).await?;
        let text = response.text().await.map_err(|e| self.classify_reqwest(e))?;

        serde_json::from_str(&text).map_err(ClientError::from)
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    fn classify(&self, error: reqwest_middleware::Error) -> ClientError {
        match error {
            reqwest_middleware::Error::Reqwest(e) => self.classify_reqwest(e),
            other => ClientError::Middleware(other),
        }
    }

    fn classify_reqwest(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() { ClientError::Timeout(self.timeout) } else { ClientError::Http(error) }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("rate_limited", &self.limiter.is_some())
            .field("cached", &self.cache.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Map non-success statuses to typed errors.
async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            Err(ClientError::rate_limited(retry_after))
        }
        404 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::not_found(text))
        }
        400 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::bad_request(text))
        }
        401 | 403 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::Unauthorized { status: status.as_u16(), message: text })
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
        }
    }
}

/// Generate cache key.
fn cache_key(method: &str, url: &str, params: &[(String, String)]) -> String {
    use md5::{Digest, Md5};

    let mut hasher = Md5::new();
    hasher.update(method.as_bytes());
    hasher.update(b"|");
    hasher.update(url.as_bytes());
    hasher.update(b"|");

    for (k, v) in params {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    format!("{:x}", hasher.finalize())
}
