//! Survey synthesis from per-paper summaries.

use std::fmt::Write as _;

use tracing::info;

use crate::error::LlmError;
use crate::llm::LanguageModel;
use crate::models::SummarizedPaper;
use crate::prompts;

/// Render the summaries as citation-keyed reference blocks.
#[must_use]
pub fn format_papers_for_synthesis(papers: &[SummarizedPaper]) -> String {
    let mut out = String::new();
    for entry in papers {
        let paper = entry.paper();
        let date = paper.published_date.map_or_else(|| "n.d.".to_string(), |d| d.to_string());

        let _ = writeln!(out, "--- Paper Reference: [{}] ---", paper.citation_key());
        let _ = writeln!(out, "Title: {}", paper.title);
        let _ = writeln!(out, "Authors: {}", paper.author_names());
        let _ = writeln!(out, "Date: {date}");
        let _ = writeln!(out, "Summary: {}", entry.summary);
        out.push_str("Key Findings:\n");
        for finding in &entry.key_findings {
            let _ = writeln!(out, "- {finding}");
        }
        out.push('\n');
    }
    out
}

/// Ask the model to write the survey.
pub async fn synthesize(
    model: &dyn LanguageModel,
    topic: &str,
    papers: &[SummarizedPaper],
) -> Result<String, LlmError> {
    info!(topic, papers = papers.len(), "Synthesizing survey");

    let prompt = format!(
        "Topic: {topic}\n\nSummaries of the relevant papers:\n\n{}\n\
         Write the state-of-the-art survey now.",
        format_papers_for_synthesis(papers)
    );
    model.generate(prompts::SURVEY_SYNTHESIS, &prompt).await
}
