//! Configuration for the paper survey pipeline.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::ranking::RankingWeights;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// arXiv Atom query endpoint.
    pub const ARXIV_API: &str = "http://export.arxiv.org/api/query";

    /// Semantic Scholar Graph API endpoint.
    pub const GRAPH_API: &str = "https://api.semanticscholar.org/graph/v1";

    /// OpenAI-compatible chat completions base URL (OpenRouter).
    pub const LLM_API: &str = "https://openrouter.ai/api/v1";

    /// Default chat model.
    pub const LLM_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";

    /// Request timeout for catalog and model calls.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Timeout for a single PDF download.
    pub const PDF_TIMEOUT: Duration = Duration::from_secs(30);

    /// arXiv asks clients to space requests by three seconds.
    pub const ARXIV_REQUEST_INTERVAL: Duration = Duration::from_secs(3);

    /// Unauthenticated Semantic Scholar budget (1 req/s).
    pub const S2_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

    /// Search response cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cached search responses.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Retries for transient HTTP failures.
    pub const MAX_RETRIES: u32 = 3;

    /// Backoff bounds for the retry middleware.
    pub const RETRY_MIN_BACKOFF: Duration = Duration::from_secs(1);

    /// Upper bound for a single backoff step.
    pub const RETRY_MAX_BACKOFF: Duration = Duration::from_secs(20);

    /// User agent sent to every host.
    pub const USER_AGENT: &str = "PaperSurveyAgent/1.0";
}

/// Pipeline defaults.
pub mod defaults {
    use std::time::Duration;

    /// Records requested from each source.
    pub const MAX_RESULTS_PER_SOURCE: usize = 10;

    /// Hard cap on records requested from a source in one call.
    pub const MAX_RESULTS_CAP: usize = 100;

    /// Papers carried into summarization.
    pub const TOP_K: usize = 10;

    /// Ranked candidates kept for download backfill.
    pub const CANDIDATE_POOL: usize = 20;

    /// Title similarity at or above which two records are the same paper.
    pub const FUZZY_THRESHOLD: f64 = 0.85;

    /// Concurrent PDF downloads.
    pub const MAX_CONCURRENT_DOWNLOADS: usize = 5;

    /// Concurrent summarization calls.
    pub const MAX_CONCURRENT_SUMMARIES: usize = 3;

    /// Paper text characters sent per summary prompt.
    pub const MAX_SUMMARY_CHARS: usize = 80_000;

    /// Whole-run deadline.
    pub const RUN_TIMEOUT: Duration = Duration::from_secs(300);

    /// Sampling temperature.
    pub const LLM_TEMPERATURE: f64 = 0.7;

    /// Completion length limit.
    pub const LLM_MAX_TOKENS: u32 = 1024;

    /// Cache directory relative to the working directory.
    pub const CACHE_DIR: &str = "data";
}

/// Language model endpoint settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,

    /// Model name.
    pub model: String,

    /// Bearer key (optional for local endpoints).
    pub api_key: Option<String>,

    /// Sampling temperature.
    pub temperature: f64,

    /// Completion length limit.
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: api::LLM_API.to_string(),
            model: api::LLM_MODEL.to_string(),
            api_key: None,
            temperature: defaults::LLM_TEMPERATURE,
            max_tokens: defaults::LLM_MAX_TOKENS,
        }
    }
}

/// Deduplication and scoring settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingConfig {
    /// Component weights.
    pub weights: RankingWeights,

    /// Title similarity threshold in (0, 1].
    pub fuzzy_threshold: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { weights: RankingWeights::default(), fuzzy_threshold: defaults::FUZZY_THRESHOLD }
    }
}

impl RankingConfig {
    /// Validate weights and threshold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if !(self.fuzzy_threshold > 0.0 && self.fuzzy_threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold(self.fuzzy_threshold));
        }
        Ok(())
    }
}

/// Survey configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Semantic Scholar API key (optional).
    pub s2_api_key: Option<String>,

    /// arXiv query URL (for testing with mock servers).
    pub arxiv_api_url: String,

    /// Graph API base URL (for testing with mock servers).
    pub graph_api_url: String,

    /// Language model endpoint.
    pub llm: LlmConfig,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Timeout for one PDF download.
    pub pdf_timeout: Duration,

    /// Minimum spacing between arXiv requests.
    pub arxiv_request_interval: Duration,

    /// Minimum spacing between Semantic Scholar requests.
    pub s2_request_interval: Duration,

    /// Retries for transient HTTP failures.
    pub max_retries: u32,

    /// Smallest backoff step.
    pub retry_min_backoff: Duration,

    /// Largest backoff step.
    pub retry_max_backoff: Duration,

    /// Search response cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cached search responses.
    pub cache_max_size: u64,

    /// Root of the PDF and text cache.
    pub cache_dir: PathBuf,

    /// Records requested from each source.
    pub max_results_per_source: usize,

    /// Only keep records with a PDF link.
    pub require_pdf: bool,

    /// Papers carried into summarization.
    pub top_k: usize,

    /// Ranked candidates kept for download backfill.
    pub candidate_pool: usize,

    /// Deduplication and scoring.
    pub ranking: RankingConfig,

    /// Concurrent PDF downloads.
    pub max_concurrent_downloads: usize,

    /// Concurrent summarization calls.
    pub max_concurrent_summaries: usize,

    /// Paper text characters per summary prompt.
    pub max_summary_chars: usize,

    /// Whole-run deadline.
    pub run_timeout: Duration,

    /// User agent header.
    pub user_agent: String,
}

impl Config {
    /// Create a configuration with production endpoints and defaults.
    ///
    /// A Semantic Scholar key does not change the request interval: the
    /// default key tier is also limited to one request per second.
    #[must_use]
    pub fn new(s2_api_key: Option<String>, llm_api_key: Option<String>) -> Self {
        Self {
            s2_api_key,
            arxiv_api_url: api::ARXIV_API.to_string(),
            graph_api_url: api::GRAPH_API.to_string(),
            llm: LlmConfig { api_key: llm_api_key, ..LlmConfig::default() },
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            pdf_timeout: api::PDF_TIMEOUT,
            arxiv_request_interval: api::ARXIV_REQUEST_INTERVAL,
            s2_request_interval: api::S2_REQUEST_INTERVAL,
            max_retries: api::MAX_RETRIES,
            retry_min_backoff: api::RETRY_MIN_BACKOFF,
            retry_max_backoff: api::RETRY_MAX_BACKOFF,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            cache_dir: PathBuf::from(defaults::CACHE_DIR),
            max_results_per_source: defaults::MAX_RESULTS_PER_SOURCE,
            require_pdf: false,
            top_k: defaults::TOP_K,
            candidate_pool: defaults::CANDIDATE_POOL,
            ranking: RankingConfig::default(),
            max_concurrent_downloads: defaults::MAX_CONCURRENT_DOWNLOADS,
            max_concurrent_summaries: defaults::MAX_CONCURRENT_SUMMARIES,
            max_summary_chars: defaults::MAX_SUMMARY_CHARS,
            run_timeout: defaults::RUN_TIMEOUT,
            user_agent: api::USER_AGENT.to_string(),
        }
    }

    /// Create a test configuration pointing every endpoint at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            arxiv_api_url: format!("{}/arxiv/api/query", base_url),
            graph_api_url: format!("{}/graph/v1", base_url),
            llm: LlmConfig {
                base_url: format!("{}/llm/v1", base_url),
                api_key: Some("test-key".to_string()),
                ..LlmConfig::default()
            },
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            pdf_timeout: Duration::from_secs(5),
            arxiv_request_interval: Duration::ZERO, // No delay in tests
            s2_request_interval: Duration::ZERO,
            max_retries: 1,
            retry_min_backoff: Duration::from_millis(1),
            retry_max_backoff: Duration::from_millis(10),
            cache_ttl: Duration::ZERO, // No caching in tests
            cache_max_size: 0,
            cache_dir: std::env::temp_dir().join("paper-survey-test"),
            ..Self::new(None, None)
        }
    }

    /// Create configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config =
            Self::new(env_string("SEMANTIC_SCHOLAR_API_KEY"), env_string("LLM_API_KEY"));

        if let Some(model) = env_string("LLM_MODEL") {
            config.llm.model = model;
        }
        if let Some(url) = env_string("LLM_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = env_string("PAPER_SURVEY_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(top_k) = env_parse("PAPER_SURVEY_TOP_K")? {
            config.top_k = top_k;
            config.candidate_pool = config.candidate_pool.max(top_k);
        }
        if let Some(n) = env_parse("PAPER_SURVEY_MAX_PER_SOURCE")? {
            config.max_results_per_source = n;
        }

        let weights = &mut config.ranking.weights;
        if let Some(w) = env_parse("PAPER_SURVEY_WEIGHT_RELEVANCE")? {
            weights.relevance = w;
        }
        if let Some(w) = env_parse("PAPER_SURVEY_WEIGHT_CITATIONS")? {
            weights.citations = w;
        }
        if let Some(w) = env_parse("PAPER_SURVEY_WEIGHT_RECENCY")? {
            weights.recency = w;
        }
        if let Some(w) = env_parse("PAPER_SURVEY_WEIGHT_PDF")? {
            weights.pdf = w;
        }

        Ok(config)
    }

    /// Check if a Semantic Scholar API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.s2_api_key.is_some()
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ranking.validate()?;

        let positive = [
            ("top_k", self.top_k),
            ("max_results_per_source", self.max_results_per_source),
            ("max_concurrent_downloads", self.max_concurrent_downloads),
            ("max_concurrent_summaries", self.max_concurrent_summaries),
            ("max_summary_chars", self.max_summary_chars),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::NonPositive { field });
            }
        }
        if self.run_timeout.is_zero() {
            return Err(ConfigError::NonPositive { field: "run_timeout" });
        }
        if self.pdf_timeout.is_zero() {
            return Err(ConfigError::NonPositive { field: "pdf_timeout" });
        }

        if self.candidate_pool < self.top_k {
            return Err(ConfigError::Invalid {
                field: "candidate_pool",
                message: format!(
                    "must be at least top_k ({}), got {}",
                    self.top_k, self.candidate_pool
                ),
            });
        }
        if self.max_results_per_source > defaults::MAX_RESULTS_CAP {
            return Err(ConfigError::Invalid {
                field: "max_results_per_source",
                message: format!("must be at most {}", defaults::MAX_RESULTS_CAP),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None)
    }
}

fn env_string(var: &str) -> Option<String> {
    std::env::var(var).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(var)
        .map(|raw| raw.parse().map_err(|e: T::Err| ConfigError::Env { var, message: e.to_string() }))
        .transpose()
}
