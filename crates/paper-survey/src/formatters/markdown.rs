//! Markdown output formatting.

use std::fmt::Write as _;

use crate::models::SummarizedPaper;
use crate::pipeline::SurveyOutcome;

/// Format the survey followed by a per-paper bibliography.
#[must_use]
pub fn format_survey_markdown(outcome: &SurveyOutcome) -> String {
    let mut output = format!("# Survey: {}\n\n", outcome.topic);

    if outcome.refined_query != outcome.topic {
        let _ = writeln!(output, "*Search query*: `{}`\n", outcome.refined_query);
    }

    output.push_str(outcome.survey.trim());
    output.push_str("\n\n");
    output.push_str(&format_bibliography(&outcome.papers));
    output
}

/// Format summarized papers as a numbered reference list.
#[must_use]
pub fn format_bibliography(papers: &[SummarizedPaper]) -> String {
    if papers.is_empty() {
        return "No papers summarized.\n".to_string();
    }

    let mut output = format!("## References ({} papers)\n\n", papers.len());
    for (i, entry) in papers.iter().enumerate() {
        output.push_str(&format_reference(entry, i + 1));
        output.push_str("\n---\n\n");
    }
    output
}

/// Format a single summarized paper.
fn format_reference(entry: &SummarizedPaper, index: usize) -> String {
    let paper = entry.paper();
    let mut output = String::new();

    let _ = writeln!(output, "### {}. {} [{}]\n", index, paper.title, paper.citation_key());

    if !paper.authors.is_empty() {
        let _ = writeln!(output, "**Authors**: {}\n", paper.author_names());
    }

    let mut meta = Vec::new();
    if let Some(date) = paper.published_date {
        meta.push(format!("**Published**: {date}"));
    }
    if let Some(citations) = paper.citation_count {
        meta.push(format!("**Citations**: {citations}"));
    }
    meta.push(format!("**Source**: {}", paper.source));
    let _ = writeln!(output, "{}\n", meta.join(" | "));

    let mut links = Vec::new();
    if !paper.url.is_empty() {
        links.push(format!("[Landing page]({})", paper.url));
    }
    if let Some(pdf) = &paper.pdf_url {
        links.push(format!("[PDF]({pdf})"));
    }
    if !links.is_empty() {
        let _ = writeln!(output, "**Links**: {}\n", links.join(" | "));
    }

    if entry.processed.text_path.is_none() {
        output.push_str("*Summarized from the abstract; full text was unavailable.*\n\n");
    }

    let _ = writeln!(output, "**Summary**: {}\n", entry.summary);

    if !entry.key_findings.is_empty() {
        output.push_str("**Key findings**:\n");
        for finding in &entry.key_findings {
            let _ = writeln!(output, "- {finding}");
        }
        output.push('\n');
    }

    output
}
