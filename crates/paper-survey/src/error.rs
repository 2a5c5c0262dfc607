//! Error types for the paper survey pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Per-item failures (one source, one paper) are recorded as values in a stage report;
//! only stage-level totality failures become a [`PipelineError`].

use std::time::Duration;

use crate::models::SourceKind;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error (includes transport errors after the retry budget is spent)
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the upstream API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// Credentials rejected (401/403 response)
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Atom/XML parsing error
    #[error("Failed to parse feed: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is transient (worth retrying).
    ///
    /// The retry middleware has already spent its attempt budget by the time a
    /// transient error reaches the caller.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Middleware(reqwest_middleware::Error::Reqwest(e)) => {
                e.is_timeout() || e.is_connect()
            }
            _ => false,
        }
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// One catalog could not answer a search.
#[derive(thiserror::Error, Debug)]
#[error("{kind} unavailable: {error}")]
pub struct SourceUnavailable {
    /// Which catalog failed.
    pub kind: SourceKind,
    /// Underlying client failure.
    #[source]
    pub error: ClientError,
}

impl SourceUnavailable {
    /// Wrap a client error for the given source.
    #[must_use]
    pub const fn new(kind: SourceKind, error: ClientError) -> Self {
        Self { kind, error }
    }

    /// Whether the failure was transient (retries exhausted) rather than a hard rejection.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.error.is_retryable()
    }
}

/// Every configured source failed for one query.
#[derive(thiserror::Error, Debug)]
#[error("all {} sources failed: {}", .failures.len(), join_failures(.failures))]
pub struct AllSourcesFailed {
    /// One entry per failed source, in source order.
    pub failures: Vec<SourceUnavailable>,
}

fn join_failures(failures: &[SourceUnavailable]) -> String {
    if failures.is_empty() {
        return "no sources configured".to_string();
    }
    failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Invalid externally supplied configuration.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Ranking weights do not sum to the expected total.
    #[error("ranking weights must sum to {expected}, got {total}")]
    WeightSum {
        /// Actual sum
        total: f64,
        /// Required sum
        expected: f64,
    },

    /// A ranking weight is negative.
    #[error("ranking weight '{name}' is negative ({value})")]
    NegativeWeight {
        /// Weight name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A count, limit or duration that must be positive is zero.
    #[error("'{field}' must be positive")]
    NonPositive {
        /// Field name
        field: &'static str,
    },

    /// Two settings contradict each other.
    #[error("invalid setting '{field}': {message}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// Explanation
        message: String,
    },

    /// Fuzzy title threshold outside (0, 1].
    #[error("fuzzy title threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    /// An environment variable could not be parsed.
    #[error("environment variable {var}: {message}")]
    Env {
        /// Variable name
        var: &'static str,
        /// Parse failure
        message: String,
    },

    /// The HTTP client could not be built from the settings (bad header value, TLS backend).
    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),
}

/// A single paper's PDF could not be obtained.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The paper has no PDF link.
    #[error("no PDF URL")]
    NoPdfUrl,

    /// The download failed.
    #[error("download failed: {0}")]
    Client(#[from] ClientError),

    /// The server answered with something other than a PDF.
    #[error("not a PDF (content-type: {content_type})")]
    NotPdf {
        /// Content type reported by the server
        content_type: String,
    },

    /// Reading or writing the cache failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The download queue was shut down.
    #[error("download queue closed")]
    Closed,
}

/// Text could not be extracted from a cached PDF.
#[derive(thiserror::Error, Debug)]
pub enum ExtractionError {
    /// The PDF could not be parsed.
    #[error("PDF parse error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The PDF parsed but contained no text.
    #[error("no text extracted")]
    Empty,

    /// Reading or writing the cache failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking extraction task died.
    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Errors from the language-model collaborator.
#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    /// The completion request failed (after retries for transient errors).
    #[error("completion request failed: {0}")]
    Client(#[from] ClientError),

    /// The model answered with no content.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The completion envelope did not have the expected shape.
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

/// A single paper could not be summarized.
#[derive(thiserror::Error, Debug)]
#[error("summarization failed for {paper_id}: {reason}")]
pub struct SummarizationFailed {
    /// Paper that failed
    pub paper_id: String,
    /// Human-readable cause
    pub reason: String,
}

/// Terminal failure of a survey run.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Invalid configuration, detected before any network activity.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The topic was blank.
    #[error("Topic cannot be empty")]
    EmptyTopic,

    /// Every source failed during retrieval.
    #[error(transparent)]
    AllSourcesFailed(#[from] AllSourcesFailed),

    /// Retrieval succeeded but no candidate survived deduplication and ranking.
    #[error("No results found")]
    NoResultsAfterRanking,

    /// None of the selected papers could be downloaded.
    #[error("No paper could be downloaded ({attempted} attempted)")]
    AllDownloadsFailed {
        /// Papers attempted
        attempted: usize,
    },

    /// Every paper failed summarization.
    #[error("All {attempted} summaries failed")]
    AllSummariesFailed {
        /// Papers attempted
        attempted: usize,
    },

    /// The final survey could not be written.
    #[error("Survey synthesis failed: {0}")]
    SynthesisFailed(#[source] LlmError),

    /// The run exceeded its deadline; no partial result is returned.
    #[error("Run exceeded timeout of {0:?}")]
    Timeout(Duration),
}

impl PipelineError {
    /// Convert to a user-facing message for the UI collaborator.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Configuration(e) => format!("The survey is misconfigured: {e}."),
            Self::EmptyTopic => "Please enter a research topic.".to_string(),
            Self::AllSourcesFailed(_) => {
                "No results found: every paper source is currently unavailable. Please try again later."
                    .to_string()
            }
            Self::NoResultsAfterRanking => {
                "No results found for this topic. Try a broader query.".to_string()
            }
            Self::AllDownloadsFailed { .. } => {
                "Papers were found, but none of their PDFs could be downloaded.".to_string()
            }
            Self::AllSummariesFailed { .. } => {
                "Papers were downloaded, but none could be summarized.".to_string()
            }
            Self::SynthesisFailed(_) => "The final survey could not be generated.".to_string(),
            Self::Timeout(limit) => {
                format!("The survey took longer than {}s and was cancelled.", limit.as_secs())
            }
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
