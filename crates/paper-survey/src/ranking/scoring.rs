//! Four-component scoring of deduplicated candidates.
//!
//! Citation and recency components are normalized across the candidate set,
//! so a score is only meaningful relative to the papers it was computed with.

use std::collections::HashMap;

use chrono::Datelike;
use serde::Serialize;

use super::RankingWeights;
use crate::models::Paper;

/// Value of the PDF component when a link is present.
pub const PDF_BONUS: f64 = 1.0;

/// Relevance when the topic yields no keywords.
const NEUTRAL_RELEVANCE: f64 = 0.5;

/// Relevance floor when no keyword occurs.
const MIN_RELEVANCE: f64 = 0.1;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
    "it", "its", "of", "on", "that", "the", "to", "was", "will", "with", "this", "these",
    "those", "using", "based", "can", "we", "our", "use", "used", "how", "what", "when",
];

/// A candidate with its scoring breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPaper {
    /// The candidate.
    pub paper: Paper,
    /// Keyword relevance in [0, 1].
    pub relevance: f64,
    /// Normalized citations in [0, 1].
    pub citations: f64,
    /// Normalized recency in [0, 1].
    pub recency: f64,
    /// PDF bonus (0 or [`PDF_BONUS`]).
    pub pdf_bonus: f64,
    /// Weighted sum.
    pub score: f64,
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Lowercase topic words minus stop-words and words of two characters or fewer.
///
/// First occurrence order, no repeats.
#[must_use]
pub fn extract_keywords(topic: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in tokenize(topic) {
        let keep = word.chars().count() > 2 && !STOPWORDS.contains(&word.as_str());
        if keep && !keywords.contains(&word) {
            keywords.push(word);
        }
    }
    keywords
}

/// Keyword relevance of a paper's title and abstract.
#[must_use]
pub fn relevance(paper: &Paper, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return NEUTRAL_RELEVANCE;
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in tokenize(&paper.title).chain(tokenize(&paper.r#abstract)) {
        *counts.entry(word).or_default() += 1;
    }

    let found = keywords.iter().filter(|k| counts.contains_key(k.as_str())).count();
    if found == 0 {
        return MIN_RELEVANCE;
    }
    let occurrences: usize = keywords.iter().filter_map(|k| counts.get(k.as_str())).sum();

    let title = paper.title.to_lowercase();
    let title_hits = keywords.iter().filter(|k| title.contains(k.as_str())).count();

    let n = keywords.len() as f64;
    let coverage = found as f64 / n;
    let frequency = (occurrences as f64 / (3.0 * n)).min(1.0);
    let title_boost = (0.5 * title_hits as f64 / n).min(0.5);

    (0.5 * coverage + 0.3 * frequency + title_boost).min(1.0)
}

fn log_citations(paper: &Paper) -> f64 {
    (paper.citations() as f64 + 1.0).log10()
}

fn day_number(paper: &Paper) -> Option<i64> {
    paper.published_date.map(|d| i64::from(d.num_days_from_ce()))
}

/// Score every candidate against the topic keywords and each other.
#[must_use]
pub fn score_all(
    papers: Vec<Paper>,
    keywords: &[String],
    weights: &RankingWeights,
) -> Vec<ScoredPaper> {
    let max_log = papers.iter().map(log_citations).fold(0.0_f64, f64::max);

    let days: Vec<i64> = papers.iter().filter_map(day_number).collect();
    let range = days.iter().min().zip(days.iter().max()).map(|(&lo, &hi)| (lo, hi));

    papers
        .into_iter()
        .map(|paper| {
            let relevance = relevance(&paper, keywords);

            let citations = if max_log > 0.0 { log_citations(&paper) / max_log } else { 0.0 };

            let recency = match (day_number(&paper), range) {
                (Some(day), Some((lo, hi))) if hi > lo => (day - lo) as f64 / (hi - lo) as f64,
                (Some(_), Some(_)) => 1.0,
                _ => 0.0,
            };

            let pdf_bonus = if paper.has_pdf() { PDF_BONUS } else { 0.0 };

            let score = weights.relevance * relevance
                + weights.citations * citations
                + weights.recency * recency
                + weights.pdf * pdf_bonus;

            ScoredPaper { paper, relevance, citations, recency, pdf_bonus, score }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::SourceKind;

    fn paper(id: &str, title: &str) -> Paper {
        Paper::new(id, title, SourceKind::SemanticScholar)
    }

    #[test]
    fn test_extract_keywords() {
        assert_eq!(
            extract_keywords("The use of Transformers in NLP, using transformers!"),
            vec!["transformers", "nlp"]
        );
        assert!(extract_keywords("a to of").is_empty());
    }

    #[test]
    fn test_relevance_bounds() {
        let keywords = extract_keywords("graph neural networks");
        let hit = paper("a", "Graph Neural Networks").with_abstract("graph networks on graph data");
        let miss = paper("b", "Protein Folding");

        let r = relevance(&hit, &keywords);
        assert!(r > 0.9 && r <= 1.0);
        assert_eq!(relevance(&miss, &keywords), MIN_RELEVANCE);
        assert_eq!(relevance(&miss, &[]), NEUTRAL_RELEVANCE);
    }

    #[test]
    fn test_citation_component_is_log_ratio() {
        let papers = vec![
            paper("a", "x").with_citations(999),
            paper("b", "y").with_citations(9),
            paper("c", "z"),
        ];
        let scored = score_all(papers, &[], &RankingWeights::default());
        assert!((scored[0].citations - 1.0).abs() < 1e-12);
        assert!((scored[1].citations - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(scored[2].citations, 0.0);
    }

    #[test]
    fn test_recency_component() {
        let d = |y| NaiveDate::from_ymd_opt(y, 1, 1).unwrap();
        let papers = vec![
            paper("old", "x").with_date(d(2000)),
            paper("new", "y").with_date(d(2020)),
            paper("undated", "z"),
        ];
        let scored = score_all(papers, &[], &RankingWeights::default());
        assert_eq!(scored[0].recency, 0.0);
        assert_eq!(scored[1].recency, 1.0);
        assert_eq!(scored[2].recency, 0.0);

        let single =
            score_all(vec![paper("a", "x").with_date(d(2010))], &[], &RankingWeights::default());
        assert_eq!(single[0].recency, 1.0);
    }

    #[test]
    fn test_combined_score_uses_weights() {
        let weights = RankingWeights { relevance: 0.0, citations: 0.0, recency: 0.0, pdf: 1.0 };
        let scored = score_all(
            vec![paper("a", "x").with_pdf_url("https://x/a.pdf"), paper("b", "y")],
            &[],
            &weights,
        );
        assert_eq!(scored[0].score, 1.0);
        assert_eq!(scored[1].score, 0.0);
    }
}
