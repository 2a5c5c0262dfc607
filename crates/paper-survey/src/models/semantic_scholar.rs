//! Semantic Scholar Graph API record format.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Fields requested from `/paper/search`.
pub const SEARCH_FIELDS: &[&str] = &[
    "paperId",
    "title",
    "abstract",
    "authors",
    "year",
    "publicationDate",
    "url",
    "openAccessPdf",
    "citationCount",
    "fieldsOfStudy",
    "externalIds",
];

/// Decode a field, falling back to its default when the value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// A paper as returned by the Graph API.
///
/// Every field is optional and decoded leniently: a null or mistyped field
/// becomes absent instead of failing the record. Validation happens when the
/// record is mapped to a [`Paper`](super::Paper).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S2Paper {
    /// Semantic Scholar paper ID.
    #[serde(default, deserialize_with = "lenient")]
    pub paper_id: Option<String>,

    /// Paper title.
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,

    /// Paper abstract.
    #[serde(default, deserialize_with = "lenient")]
    pub r#abstract: Option<String>,

    /// Publication year.
    #[serde(default, deserialize_with = "lenient")]
    pub year: Option<i32>,

    /// Publication date in ISO format (YYYY-MM-DD).
    #[serde(default, deserialize_with = "lenient")]
    pub publication_date: Option<String>,

    /// Landing page.
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,

    /// Number of citations this paper has received.
    #[serde(default, deserialize_with = "lenient")]
    pub citation_count: Option<i64>,

    /// Fields of study (e.g., "Computer Science", "Medicine").
    #[serde(default, deserialize_with = "lenient")]
    pub fields_of_study: Option<Vec<String>>,

    /// List of authors.
    #[serde(default, deserialize_with = "lenient")]
    pub authors: Vec<S2Author>,

    /// Open access PDF information.
    #[serde(default, deserialize_with = "lenient")]
    pub open_access_pdf: Option<OpenAccessPdf>,

    /// External identifiers (DOI, ArXiv, ...).
    #[serde(default, deserialize_with = "lenient")]
    pub external_ids: Option<ExternalIds>,
}

impl S2Paper {
    /// Get the open access PDF URL if available and non-empty.
    #[must_use]
    pub fn pdf_url(&self) -> Option<&str> {
        self.open_access_pdf.as_ref()?.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Get the ArXiv ID if available.
    #[must_use]
    pub fn arxiv_id(&self) -> Option<&str> {
        self.external_ids.as_ref()?.arxiv.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Author reference inside a paper record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S2Author {
    /// Author ID.
    #[serde(default, deserialize_with = "lenient")]
    pub author_id: Option<String>,

    /// Display name.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

/// Open access PDF information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAccessPdf {
    /// Direct URL to the PDF.
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,

    /// Status of open access.
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
}

/// External identifiers for a paper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalIds {
    /// Digital Object Identifier.
    #[serde(rename = "DOI", default, deserialize_with = "lenient")]
    pub doi: Option<String>,

    /// ArXiv preprint ID.
    #[serde(rename = "ArXiv", default, deserialize_with = "lenient")]
    pub arxiv: Option<String>,
}

/// Search response envelope.
///
/// `data` stays untyped so one malformed record cannot fail the whole page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct S2SearchResponse {
    /// Total number of matching papers.
    #[serde(default)]
    pub total: i64,

    /// Current offset in the result set.
    #[serde(default)]
    pub offset: i64,

    /// Offset of the next page, if any.
    #[serde(default)]
    pub next: Option<i64>,

    /// Raw paper records.
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}
