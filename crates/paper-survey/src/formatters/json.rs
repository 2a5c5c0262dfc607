//! JSON output formatting for machine consumers.

use serde_json::{Value, json};

use crate::models::SummarizedPaper;
use crate::pipeline::SurveyOutcome;

/// Compact representation of a summarized paper.
#[must_use]
pub fn compact_paper(entry: &SummarizedPaper) -> Value {
    let paper = entry.paper();
    let mut obj = json!({
        "id": paper.id,
        "title": paper.title,
        "source": paper.source,
        "citation_key": paper.citation_key(),
        "summary": entry.summary,
        "key_findings": entry.key_findings,
        "full_text": entry.processed.text_path.is_some(),
    });

    if !paper.authors.is_empty() {
        obj["authors"] = json!(paper.authors);
    }

    if let Some(date) = paper.published_date {
        obj["published"] = json!(date);
    }

    if let Some(citations) = paper.citation_count {
        obj["citations"] = json!(citations);
    }

    if !paper.url.is_empty() {
        obj["url"] = json!(paper.url);
    }

    if let Some(pdf) = &paper.pdf_url {
        obj["pdf"] = json!(pdf);
    }

    obj
}

/// Full outcome as JSON: survey text, compact papers and diagnostics.
#[must_use]
pub fn format_outcome_json(outcome: &SurveyOutcome) -> Value {
    json!({
        "topic": outcome.topic,
        "refined_query": outcome.refined_query,
        "survey": outcome.survey,
        "papers": outcome.papers.iter().map(compact_paper).collect::<Vec<_>>(),
        "diagnostics": outcome.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Paper, ProcessedPaper, SourceKind};

    #[test]
    fn test_compact_paper_omits_absent_fields() {
        let entry = SummarizedPaper {
            processed: ProcessedPaper {
                paper: Paper::new("s2:abc", "Title", SourceKind::SemanticScholar),
                pdf: None,
                text_path: None,
            },
            summary: "S".to_string(),
            key_findings: vec![],
        };
        let obj = compact_paper(&entry);
        assert_eq!(obj["id"], "s2:abc");
        assert_eq!(obj["source"], "semantic_scholar");
        assert_eq!(obj["citation_key"], "Unknown et al., n.d.");
        assert_eq!(obj["full_text"], false);
        assert!(obj.get("pdf").is_none());
        assert!(obj.get("citations").is_none());
    }
}
