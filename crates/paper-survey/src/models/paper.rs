//! Canonical paper records shared by every pipeline stage.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ContentRef;

/// The catalog a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// arXiv preprint archive (Atom feed API).
    Arxiv,
    /// Semantic Scholar citation graph (Graph API).
    SemanticScholar,
}

impl SourceKind {
    /// Stable machine name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arxiv => "arxiv",
            Self::SemanticScholar => "semantic_scholar",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arxiv => f.write_str("arXiv"),
            Self::SemanticScholar => f.write_str("Semantic Scholar"),
        }
    }
}

/// A discovered publication.
///
/// `id` is source-qualified (`arxiv:1706.03762`, `s2:<paperId>`) and unique within
/// one source's result set, but two ids may still name the same logical paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Source-qualified identifier.
    pub id: String,

    /// Paper title.
    pub title: String,

    /// Author names in byline order.
    pub authors: Vec<String>,

    /// Abstract text (may be empty).
    pub r#abstract: String,

    /// Publication date, when the source provides one.
    pub published_date: Option<NaiveDate>,

    /// Catalog that produced this record.
    pub source: SourceKind,

    /// Landing page URL.
    pub url: String,

    /// Direct PDF link, when available.
    pub pdf_url: Option<String>,

    /// Number of citations, when the source reports it.
    pub citation_count: Option<u64>,

    /// Categories or fields of study.
    pub categories: BTreeSet<String>,
}

impl Paper {
    /// Create a record with only the required fields set.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, source: SourceKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            r#abstract: String::new(),
            published_date: None,
            source,
            url: String::new(),
            pdf_url: None,
            citation_count: None,
            categories: BTreeSet::new(),
        }
    }

    /// Set the abstract.
    #[must_use]
    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.r#abstract = text.into();
        self
    }

    /// Set the authors.
    #[must_use]
    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set the PDF link.
    #[must_use]
    pub fn with_pdf_url(mut self, url: impl Into<String>) -> Self {
        self.pdf_url = Some(url.into());
        self
    }

    /// Set the citation count.
    #[must_use]
    pub const fn with_citations(mut self, count: u64) -> Self {
        self.citation_count = Some(count);
        self
    }

    /// Set the publication date.
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.published_date = Some(date);
        self
    }

    /// Citation count, absent counted as zero.
    #[must_use]
    pub fn citations(&self) -> u64 {
        self.citation_count.unwrap_or(0)
    }

    /// Whether a PDF link is present.
    #[must_use]
    pub const fn has_pdf(&self) -> bool {
        self.pdf_url.is_some()
    }

    /// Publication year if known.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.published_date.map(|d| d.year())
    }

    /// Get the first author's name if available.
    #[must_use]
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// Get author names as a comma-separated string.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authors.join(", ")
    }

    /// Short in-text citation, e.g. `Vaswani et al., 2017`.
    #[must_use]
    pub fn citation_key(&self) -> String {
        let surname = self
            .first_author()
            .and_then(|name| name.split_whitespace().last())
            .unwrap_or("Unknown");
        let year = self.year().map_or_else(|| "n.d.".to_string(), |y| y.to_string());
        format!("{surname} et al., {year}")
    }
}

/// A ranked paper after the fetch and extraction stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedPaper {
    /// The ranked record.
    pub paper: Paper,

    /// Cached PDF, absent when the download failed.
    pub pdf: Option<ContentRef>,

    /// Cached extracted text, absent when download or extraction failed.
    pub text_path: Option<ContentRef>,
}

/// A processed paper with its language-model summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizedPaper {
    /// The processed paper.
    #[serde(flatten)]
    pub processed: ProcessedPaper,

    /// One-paragraph summary.
    pub summary: String,

    /// Key findings in the order the model listed them.
    pub key_findings: Vec<String>,
}

impl SummarizedPaper {
    /// The underlying paper record.
    #[must_use]
    pub const fn paper(&self) -> &Paper {
        &self.processed.paper
    }
}
