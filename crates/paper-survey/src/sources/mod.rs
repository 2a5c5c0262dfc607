//! Source clients: one per external catalog.
//!
//! Each client maps its catalog's native record format to [`Paper`] and turns
//! any failure of its own catalog into a [`SourceUnavailable`], so one
//! catalog going down never takes the other with it.

mod arxiv;
mod semantic_scholar;

use async_trait::async_trait;
use tracing::warn;

pub use arxiv::ArxivSource;
pub use semantic_scholar::SemanticScholarSource;

use crate::config::defaults;
use crate::error::SourceUnavailable;
use crate::models::{Paper, RawRecord, SourceKind};

/// A searchable academic catalog.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Which catalog this is.
    fn kind(&self) -> SourceKind;

    /// Search for up to `max_results` papers.
    ///
    /// `Ok(vec![])` means the catalog answered with no matches; every transport,
    /// status or envelope failure is a [`SourceUnavailable`] after retries.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Paper>, SourceUnavailable>;
}

/// Number of records to request for a call asking for `max_results`.
///
/// With `require_pdf`, twice as many are requested since some are dropped.
#[must_use]
pub fn request_size(max_results: usize, require_pdf: bool) -> usize {
    let wanted = if require_pdf { max_results.saturating_mul(2) } else { max_results };
    wanted.clamp(1, defaults::MAX_RESULTS_CAP)
}

/// Map raw records, dropping rejected ones (and PDF-less ones when required).
pub(crate) fn map_records(
    kind: SourceKind,
    records: impl IntoIterator<Item = RawRecord>,
    max_results: usize,
    require_pdf: bool,
) -> Vec<Paper> {
    let mut papers = Vec::new();
    for record in records {
        match record.into_paper() {
            Ok(paper) if require_pdf && !paper.has_pdf() => {}
            Ok(paper) => papers.push(paper),
            Err(reason) => warn!(source = %kind, %reason, "Dropped malformed record"),
        }
    }
    papers.truncate(max_results);
    papers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::semantic_scholar::S2Paper;

    fn record(id: &str, pdf: Option<&str>) -> RawRecord {
        RawRecord::SemanticScholar(S2Paper {
            paper_id: Some(id.to_string()),
            title: Some(format!("Paper {id}")),
            open_access_pdf: pdf.map(|u| crate::models::semantic_scholar::OpenAccessPdf {
                url: Some(u.to_string()),
                status: None,
            }),
            ..S2Paper::default()
        })
    }

    #[test]
    fn test_request_size() {
        assert_eq!(request_size(10, false), 10);
        assert_eq!(request_size(10, true), 20);
        assert_eq!(request_size(80, true), 100);
        assert_eq!(request_size(0, false), 1);
    }

    #[test]
    fn test_map_records_require_pdf_and_truncate() {
        let records = vec![
            record("a", None),
            record("b", Some("https://x/b.pdf")),
            RawRecord::SemanticScholar(S2Paper::default()),
            record("c", Some("https://x/c.pdf")),
            record("d", Some("https://x/d.pdf")),
        ];
        let papers = map_records(SourceKind::SemanticScholar, records, 2, true);
        let ids: Vec<_> = papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["s2:b", "s2:c"]);
    }
}
