//! Query refinement.

use tracing::{info, warn};

use crate::llm::LanguageModel;
use crate::prompts;

/// Ask the model for a catalog-friendly query; fall back to the topic itself.
pub async fn refine_query(model: &dyn LanguageModel, topic: &str) -> String {
    let prompt = format!("User request: {topic}\n\nSearch query:");

    match model.generate(prompts::QUERY_REFINEMENT, &prompt).await {
        Ok(answer) => {
            let refined = clean_query(&answer);
            if refined.is_empty() {
                warn!(topic, "Model returned an empty query, using topic");
                topic.trim().to_string()
            } else {
                info!(topic, refined = %refined, "Refined query");
                refined
            }
        }
        Err(e) => {
            warn!(topic, error = %e, "Query refinement failed, using topic");
            topic.trim().to_string()
        }
    }
}

/// First non-empty line, trimmed of whitespace and surrounding quotes.
fn clean_query(answer: &str) -> String {
    answer
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::LlmError;

    struct Fixed(Result<&'static str, ()>);

    #[async_trait]
    impl LanguageModel for Fixed {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            self.0.map(str::to_string).map_err(|()| LlmError::EmptyResponse)
        }
    }

    #[test]
    fn test_clean_query() {
        assert_eq!(clean_query("  \"transformer attention\"  "), "transformer attention");
        assert_eq!(clean_query("\n'graph neural networks'\nexplanation"), "graph neural networks");
        assert_eq!(clean_query("   "), "");
    }

    #[tokio::test]
    async fn test_refine_falls_back_to_topic() {
        assert_eq!(refine_query(&Fixed(Err(())), " attention models ").await, "attention models");
        assert_eq!(refine_query(&Fixed(Ok("\"\"")), "attention").await, "attention");
        assert_eq!(refine_query(&Fixed(Ok("self-attention")), "attention").await, "self-attention");
    }
}
