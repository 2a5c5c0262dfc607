//! Mapping from source-native records to the canonical [`Paper`].
//!
//! Required fields (identifier, title) are validated here and nowhere else;
//! optional fields that are missing or malformed become absent.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

use super::arxiv::ArxivEntry;
use super::semantic_scholar::S2Paper;
use super::{Paper, SourceKind};

static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v\d+$").expect("valid version-suffix regex"));

/// A record in one of the supported upstream formats.
#[derive(Debug, Clone)]
pub enum RawRecord {
    /// arXiv Atom `<entry>`.
    Arxiv(ArxivEntry),
    /// Semantic Scholar Graph API paper.
    SemanticScholar(S2Paper),
}

/// Why a raw record could not become a [`Paper`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordRejected {
    /// No identifier could be derived.
    #[error("record has no usable identifier")]
    MissingIdentifier,

    /// Title missing or blank.
    #[error("record has no title")]
    MissingTitle,

    /// The upstream put an error report where a record should be.
    #[error("upstream error entry: {0}")]
    ApiError(String),
}

impl RawRecord {
    /// The catalog this record format belongs to.
    #[must_use]
    pub const fn source(&self) -> SourceKind {
        match self {
            Self::Arxiv(_) => SourceKind::Arxiv,
            Self::SemanticScholar(_) => SourceKind::SemanticScholar,
        }
    }

    /// Validate and convert to the canonical shape.
    pub fn into_paper(self) -> Result<Paper, RecordRejected> {
        match self {
            Self::Arxiv(entry) => map_arxiv(entry),
            Self::SemanticScholar(paper) => map_semantic_scholar(paper),
        }
    }
}

fn map_arxiv(entry: ArxivEntry) -> Result<Paper, RecordRejected> {
    if entry.is_api_error() {
        let message = entry.summary.as_deref().map(collapse_whitespace).unwrap_or_default();
        return Err(RecordRejected::ApiError(message));
    }

    let abs_url = entry
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(RecordRejected::MissingIdentifier)?;
    let arxiv_id = arxiv_id_from_url(abs_url).ok_or(RecordRejected::MissingIdentifier)?;
    let title = non_blank(entry.title.as_deref()).ok_or(RecordRejected::MissingTitle)?;

    let pdf_url = entry
        .pdf_link()
        .and_then(http_url)
        .or_else(|| abs_url.contains("/abs/").then(|| abs_url.replace("/abs/", "/pdf/")));

    Ok(Paper {
        id: format!("arxiv:{arxiv_id}"),
        title,
        authors: entry.authors.iter().filter_map(|a| non_blank(a.name.as_deref())).collect(),
        r#abstract: entry.summary.as_deref().map(collapse_whitespace).unwrap_or_default(),
        published_date: entry.published.as_deref().and_then(parse_date),
        source: SourceKind::Arxiv,
        url: abs_url.to_string(),
        pdf_url,
        citation_count: None,
        categories: entry.categories.iter().filter_map(|c| non_blank(c.term.as_deref())).collect(),
    })
}

fn map_semantic_scholar(paper: S2Paper) -> Result<Paper, RecordRejected> {
    let paper_id = non_blank(paper.paper_id.as_deref());
    let arxiv_id = paper.arxiv_id().and_then(|id| arxiv_id_from_url(id.trim()));

    let id = match (&arxiv_id, &paper_id) {
        (Some(arxiv), _) => format!("arxiv:{arxiv}"),
        (None, Some(s2)) => format!("s2:{s2}"),
        (None, None) => return Err(RecordRejected::MissingIdentifier),
    };
    let title = non_blank(paper.title.as_deref()).ok_or(RecordRejected::MissingTitle)?;

    let published_date = paper
        .publication_date
        .as_deref()
        .and_then(parse_date)
        .or_else(|| paper.year.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)));

    let url = paper.url.as_deref().and_then(http_url).unwrap_or_else(|| match &paper_id {
        Some(s2) => format!("https://www.semanticscholar.org/paper/{s2}"),
        None => format!("https://arxiv.org/abs/{}", arxiv_id.as_deref().unwrap_or_default()),
    });

    Ok(Paper {
        id,
        title,
        authors: paper.authors.iter().filter_map(|a| non_blank(a.name.as_deref())).collect(),
        r#abstract: paper.r#abstract.as_deref().map(collapse_whitespace).unwrap_or_default(),
        published_date,
        source: SourceKind::SemanticScholar,
        url,
        pdf_url: paper.pdf_url().and_then(http_url),
        citation_count: paper.citation_count.and_then(|c| u64::try_from(c).ok()),
        categories: paper
            .fields_of_study
            .unwrap_or_default()
            .iter()
            .filter_map(|f| non_blank(Some(f.as_str())))
            .collect(),
    })
}

/// `http://arxiv.org/abs/1706.03762v7` → `1706.03762`; old-style ids keep their archive prefix.
fn arxiv_id_from_url(value: &str) -> Option<String> {
    let tail = match value.split_once("/abs/") {
        Some((_, rest)) => rest,
        None if value.contains("://") => value.rsplit('/').next().unwrap_or(value),
        None => value,
    };
    let id = VERSION_SUFFIX.replace(tail.trim().trim_end_matches('/'), "");
    (!id.is_empty()).then(|| id.into_owned())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| value.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

fn http_url(value: &str) -> Option<String> {
    let parsed = url::Url::parse(value.trim()).ok()?;
    matches!(parsed.scheme(), "http" | "https").then(|| parsed.to_string())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(collapse_whitespace).filter(|s| !s.is_empty())
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
