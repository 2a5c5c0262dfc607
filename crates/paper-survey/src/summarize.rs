//! Per-paper summarization.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::SummarizationFailed;
use crate::extract::TextStage;
use crate::llm::LanguageModel;
use crate::models::{ProcessedPaper, StageReport, SummarizedPaper};
use crate::prompts;

/// Summary used when the model's JSON has no `summary` field.
const MISSING_SUMMARY: &str = "No summary generated.";

#[derive(Debug, Deserialize)]
struct SummaryAnswer {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    key_findings: Vec<String>,
}

/// Summarizes processed papers with bounded concurrency.
#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
    texts: TextStage,
    concurrency: usize,
    max_chars: usize,
}

impl Summarizer {
    /// Create a summarizer reading paper text through `texts`.
    #[must_use]
    pub fn new(
        model: Arc<dyn LanguageModel>,
        texts: TextStage,
        concurrency: usize,
        max_chars: usize,
    ) -> Self {
        Self { model, texts, concurrency: concurrency.max(1), max_chars }
    }

    /// Summarize every paper; output keeps input order.
    pub async fn summarize_all(
        &self,
        papers: Vec<ProcessedPaper>,
    ) -> StageReport<SummarizedPaper, SummarizationFailed> {
        let total = papers.len();
        let results: Vec<_> = stream::iter(papers)
            .map(|paper| self.summarize_one(paper))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = StageReport::new();
        for result in results {
            match result {
                Ok(summarized) => report.items.push(summarized),
                Err(failure) => {
                    warn!(paper_id = %failure.paper_id, reason = %failure.reason, "Summary failed");
                    report.failures.push(failure);
                }
            }
        }

        info!(summarized = report.items.len(), total, "Summarization complete");
        report
    }

    /// Summarize one paper from its text, or its abstract when text is absent.
    pub async fn summarize_one(
        &self,
        paper: ProcessedPaper,
    ) -> Result<SummarizedPaper, SummarizationFailed> {
        let fail = |reason: String| SummarizationFailed { paper_id: paper.paper.id.clone(), reason };

        let text = match &paper.text_path {
            Some(text_ref) => match self.texts.read_text(text_ref).await {
                Ok(text) if !text.trim().is_empty() => Some(text),
                Ok(_) => None,
                Err(e) => {
                    warn!(paper_id = %paper.paper.id, error = %e, "Cached text unreadable");
                    None
                }
            },
            None => None,
        };

        let (label, body) = match text {
            Some(text) => ("Full paper text", truncate_chars(&text, self.max_chars)),
            None if !paper.paper.r#abstract.trim().is_empty() => {
                ("Abstract", paper.paper.r#abstract.clone())
            }
            None => return Err(fail("no text or abstract available".to_string())),
        };

        let prompt = format!("Title: {}\n\n{label}:\n{body}", paper.paper.title);
        let answer = self
            .model
            .generate(prompts::PAPER_SUMMARY, &prompt)
            .await
            .map_err(|e| fail(e.to_string()))?;

        let (summary, key_findings) = parse_summary(&answer);
        Ok(SummarizedPaper { processed: paper, summary, key_findings })
    }
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("concurrency", &self.concurrency)
            .field("max_chars", &self.max_chars)
            .finish_non_exhaustive()
    }
}

/// Keep at most `max_chars` characters, marking the cut.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], prompts::TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Strip a surrounding Markdown code fence.
fn strip_fences(answer: &str) -> &str {
    let mut cleaned = answer.trim();
    if cleaned.starts_with("```") {
        cleaned = cleaned.split_once('\n').map_or("", |(_, rest)| rest);
        cleaned = cleaned.trim_end().strip_suffix("```").unwrap_or(cleaned);
    }
    cleaned.trim()
}

/// Parse the model's JSON answer into summary and findings.
///
/// Unparsable answers keep the raw text as the summary with a placeholder finding.
#[must_use]
pub fn parse_summary(answer: &str) -> (String, Vec<String>) {
    match serde_json::from_str::<SummaryAnswer>(strip_fences(answer)) {
        Ok(parsed) => (
            parsed
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| MISSING_SUMMARY.to_string()),
            parsed.key_findings,
        ),
        Err(e) => {
            warn!(error = %e, "Summary answer is not valid JSON");
            (answer.trim().to_string(), vec![prompts::UNPARSED_FINDING.to_string()])
        }
    }
}
