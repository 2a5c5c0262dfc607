//! Scoring weights for the ranker.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Weights must sum to this value.
pub const EXPECTED_SUM: f64 = 1.0;

/// Allowed drift from [`EXPECTED_SUM`].
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Weights applied to the four scoring components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    /// Keyword relevance to the topic.
    pub relevance: f64,
    /// Normalized citation count.
    pub citations: f64,
    /// Normalized publication recency.
    pub recency: f64,
    /// Bonus for having a PDF link.
    pub pdf: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self { relevance: 0.4, citations: 0.3, recency: 0.2, pdf: 0.1 }
    }
}

impl RankingWeights {
    /// Named weights in scoring order.
    #[must_use]
    pub const fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("relevance", self.relevance),
            ("citations", self.citations),
            ("recency", self.recency),
            ("pdf", self.pdf),
        ]
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.named().iter().map(|(_, w)| w).sum()
    }

    /// Reject negative weights and sums other than 1.0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.named() {
            if value < 0.0 || !value.is_finite() {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }

        let total = self.total();
        if (total - EXPECTED_SUM).abs() > SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { total, expected: EXPECTED_SUM });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_valid() {
        let w = RankingWeights::default();
        assert!(w.validate().is_ok());
        assert!((w.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weight_sum_rejected() {
        let w = RankingWeights { relevance: 0.5, ..RankingWeights::default() };
        assert!(matches!(w.validate(), Err(ConfigError::WeightSum { .. })));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let w = RankingWeights { relevance: 0.6, citations: -0.1, recency: 0.4, pdf: 0.1 };
        assert_eq!(
            w.validate(),
            Err(ConfigError::NegativeWeight { name: "citations", value: -0.1 })
        );
    }

    #[test]
    fn test_tiny_drift_accepted() {
        let w = RankingWeights { relevance: 0.4 + 1e-9, ..RankingWeights::default() };
        assert!(w.validate().is_ok());
    }
}
