//! Error display and user message tests.

use std::time::Duration;

use paper_survey::error::{
    AllSourcesFailed, ClientError, ConfigError, FetchError, LlmError, PipelineError,
    SourceUnavailable, SummarizationFailed,
};
use paper_survey::models::SourceKind;

#[test]
fn test_every_pipeline_error_has_user_message() {
    let errors = vec![
        PipelineError::Configuration(ConfigError::NonPositive { field: "top_k" }),
        PipelineError::EmptyTopic,
        PipelineError::AllSourcesFailed(AllSourcesFailed { failures: Vec::new() }),
        PipelineError::NoResultsAfterRanking,
        PipelineError::AllDownloadsFailed { attempted: 10 },
        PipelineError::AllSummariesFailed { attempted: 10 },
        PipelineError::SynthesisFailed(LlmError::EmptyResponse),
        PipelineError::Timeout(Duration::from_secs(300)),
    ];

    for err in &errors {
        let message = err.to_user_message();
        assert!(!message.is_empty(), "{err:?}");
        assert!(!message.contains("Error("), "debug text leaked for {err:?}");
    }
}

#[test]
fn test_all_sources_failed_user_message() {
    let err = PipelineError::from(AllSourcesFailed {
        failures: vec![SourceUnavailable::new(SourceKind::Arxiv, ClientError::rate_limited(3))],
    });
    assert!(err.to_user_message().starts_with("No results found"));
    assert!(err.to_string().contains("arXiv unavailable"));
}

#[test]
fn test_config_error_converts() {
    let err: PipelineError = ConfigError::InvalidThreshold(2.0).into();
    assert!(matches!(err, PipelineError::Configuration(_)));
    assert!(err.to_user_message().contains("misconfigured"));
}

#[test]
fn test_source_unavailable_display() {
    let err = SourceUnavailable::new(SourceKind::SemanticScholar, ClientError::server(502, "bad gateway"));
    assert_eq!(err.to_string(), "Semantic Scholar unavailable: Server error (502): bad gateway");
    assert!(err.is_transient());

    let err = SourceUnavailable::new(SourceKind::Arxiv, ClientError::bad_request("bad query"));
    assert!(!err.is_transient());
}

#[test]
fn test_client_error_unauthorized_not_retryable() {
    let err = ClientError::Unauthorized { status: 403, message: "forbidden".into() };
    assert!(!err.is_retryable());
    assert_eq!(err.retry_after(), None);
}

#[test]
fn test_fetch_error_display() {
    assert_eq!(FetchError::NoPdfUrl.to_string(), "no PDF URL");
    let err = FetchError::NotPdf { content_type: "text/html".into() };
    assert_eq!(err.to_string(), "not a PDF (content-type: text/html)");

    let err = FetchError::from(ClientError::not_found("/pdf/x.pdf"));
    assert!(err.to_string().starts_with("download failed"));
}

#[test]
fn test_summarization_failed_display() {
    let err = SummarizationFailed { paper_id: "arxiv:1".into(), reason: "model overloaded".into() };
    assert_eq!(err.to_string(), "summarization failed for arxiv:1: model overloaded");
}

#[test]
fn test_synthesis_failure_keeps_source() {
    use std::error::Error as _;

    let err = PipelineError::SynthesisFailed(LlmError::EmptyResponse);
    let source = err.source().map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("model returned an empty response"));
}
