//! Configuration tests.
//!
//! Tests actual behavior, not constants.

use std::time::Duration;

use paper_survey::config::{Config, RankingConfig};
use paper_survey::error::ConfigError;
use paper_survey::ranking::RankingWeights;

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert!(!config.has_api_key());
}

#[test]
fn test_config_with_api_keys() {
    let config = Config::new(Some("s2-key".to_string()), Some("llm-key".to_string()));
    assert!(config.has_api_key());
    assert_eq!(config.llm.api_key.as_deref(), Some("llm-key"));
}

#[test]
fn test_testing_config_points_at_mock_server() {
    let config = Config::for_testing("http://127.0.0.1:4000");
    assert_eq!(config.arxiv_api_url, "http://127.0.0.1:4000/arxiv/api/query");
    assert_eq!(config.graph_api_url, "http://127.0.0.1:4000/graph/v1");
    assert_eq!(config.llm.base_url, "http://127.0.0.1:4000/llm/v1");
    assert_eq!(config.arxiv_request_interval, Duration::ZERO);
    assert!(config.validate().is_ok());
}

#[test]
fn test_weights_must_sum_to_one() {
    let mut config = Config::default();
    config.ranking.weights = RankingWeights { relevance: 0.4, citations: 0.4, recency: 0.2, pdf: 0.1 };

    match config.validate() {
        Err(ConfigError::WeightSum { total, expected }) => {
            assert!((total - 1.1).abs() < 1e-9);
            assert_eq!(expected, 1.0);
        }
        other => panic!("expected WeightSum, got {other:?}"),
    }
}

#[test]
fn test_weight_sum_tolerates_float_noise() {
    let mut config = Config::default();
    config.ranking.weights =
        RankingWeights { relevance: 0.1 + 0.2, citations: 0.3, recency: 0.3, pdf: 0.1 };
    assert!(config.validate().is_ok());
}

#[test]
fn test_negative_weight_rejected() {
    let mut config = Config::default();
    config.ranking.weights = RankingWeights { relevance: 0.6, citations: 0.3, recency: 0.2, pdf: -0.1 };
    assert_eq!(
        config.validate(),
        Err(ConfigError::NegativeWeight { name: "pdf", value: -0.1 })
    );
}

#[test]
fn test_threshold_bounds() {
    let mut config = Config::default();
    config.ranking = RankingConfig { fuzzy_threshold: 1.0, ..RankingConfig::default() };
    assert!(config.validate().is_ok());

    config.ranking.fuzzy_threshold = 0.0;
    assert_eq!(config.validate(), Err(ConfigError::InvalidThreshold(0.0)));
}

#[test]
fn test_zero_counts_rejected() {
    let cases: [(&str, fn(&mut Config)); 4] = [
        ("top_k", |c| c.top_k = 0),
        ("max_results_per_source", |c| c.max_results_per_source = 0),
        ("max_concurrent_downloads", |c| c.max_concurrent_downloads = 0),
        ("max_concurrent_summaries", |c| c.max_concurrent_summaries = 0),
    ];
    for (field, mutate) in cases {
        let mut config = Config::default();
        mutate(&mut config);
        assert_eq!(config.validate(), Err(ConfigError::NonPositive { field }), "{field}");
    }
}

#[test]
fn test_zero_run_timeout_rejected() {
    let mut config = Config::default();
    config.run_timeout = Duration::ZERO;
    assert_eq!(config.validate(), Err(ConfigError::NonPositive { field: "run_timeout" }));
}

#[test]
fn test_candidate_pool_must_cover_top_k() {
    let mut config = Config::default();
    config.top_k = 30;
    config.candidate_pool = 20;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "candidate_pool", .. })
    ));
}

#[test]
fn test_per_source_cap() {
    let mut config = Config::default();
    config.max_results_per_source = 101;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "max_results_per_source", .. })
    ));
}

#[test]
fn test_config_error_messages() {
    let err = ConfigError::WeightSum { total: 1.1, expected: 1.0 };
    assert_eq!(err.to_string(), "ranking weights must sum to 1, got 1.1");

    let err = ConfigError::NonPositive { field: "top_k" };
    assert_eq!(err.to_string(), "'top_k' must be positive");
}
