//! PDF-to-text boundary and the extraction stage.
//!
//! [`TextExtractor`] is a plain function from PDF bytes to text. The stage
//! around it reuses text already in the cache under the paper's key and stores
//! fresh extractions there for later runs.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::fetch::ContentCache;
use crate::models::{ContentRef, EntryKind, FetchedPaper, ItemFailure, ProcessedPaper, StageReport};

/// Concurrent extractions.
const EXTRACT_CONCURRENCY: usize = 4;

/// Turns PDF bytes into plain text.
pub trait TextExtractor: Send + Sync {
    /// Extract the document's text.
    fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError>;
}

/// Extractor backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError> {
        let document = lopdf::Document::load_mem(pdf)?;
        let pages: Vec<u32> = document.get_pages().keys().copied().collect();
        if pages.is_empty() {
            return Err(ExtractionError::Empty);
        }

        let text = document.extract_text(&pages)?;
        if text.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        Ok(text)
    }
}

/// Extracts text for every fetched paper, using the cache as a side store.
#[derive(Clone)]
pub struct TextStage {
    cache: Arc<dyn ContentCache>,
    extractor: Arc<dyn TextExtractor>,
}

impl TextStage {
    /// Stage over a cache and an extractor.
    #[must_use]
    pub fn new(cache: Arc<dyn ContentCache>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self { cache, extractor }
    }

    /// Extract text for each paper that has a PDF; order is preserved.
    pub async fn extract_all(&self, fetched: Vec<FetchedPaper>) -> StageReport<ProcessedPaper> {
        let results: Vec<(FetchedPaper, Result<Option<ContentRef>, ExtractionError>)> =
            stream::iter(fetched)
                .map(|item| async move {
                    let text = match &item.pdf {
                        Some(pdf) => self.text_for(pdf).await.map(Some),
                        None => Ok(None),
                    };
                    (item, text)
                })
                .buffered(EXTRACT_CONCURRENCY)
                .collect()
                .await;

        let mut report = StageReport::new();
        for (item, text) in results {
            let text_path = match text {
                Ok(text) => text,
                Err(e) => {
                    warn!(paper_id = %item.paper.id, error = %e, "Text extraction failed");
                    report.failures.push(ItemFailure::new(item.paper.id.clone(), &e));
                    None
                }
            };
            report.items.push(ProcessedPaper { paper: item.paper, pdf: item.pdf, text_path });
        }

        let extracted = report.items.iter().filter(|p| p.text_path.is_some()).count();
        info!(extracted, total = report.items.len(), "Extraction stage complete");
        report
    }

    /// Read extracted text back from the cache.
    pub async fn read_text(&self, text: &ContentRef) -> Result<String, ExtractionError> {
        let bytes = self.cache.load(text).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn text_for(&self, pdf: &ContentRef) -> Result<ContentRef, ExtractionError> {
        if let Some(hit) = self.cache.lookup(&pdf.key, EntryKind::Text).await? {
            debug!(key = %pdf.key, "Text cache hit");
            return Ok(hit);
        }

        let bytes = self.cache.load(pdf).await?;
        let extractor = Arc::clone(&self.extractor);
        let text = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))??;

        Ok(self.cache.store(&pdf.key, EntryKind::Text, text.as_bytes()).await?)
    }
}

impl std::fmt::Debug for TextStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextStage").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    use super::*;
    use crate::fetch::MemoryCache;
    use crate::models::{CacheKey, Paper, SourceKind};

    /// A one-page PDF showing `text` in Helvetica.
    pub(crate) fn sample_pdf(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    struct FixedExtractor(&'static str);

    impl TextExtractor for FixedExtractor {
        fn extract(&self, _pdf: &[u8]) -> Result<String, ExtractionError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_lopdf_extracts_text() {
        let text = LopdfExtractor.extract(&sample_pdf("Hello Survey")).unwrap();
        assert!(text.contains("Hello Survey"), "got {text:?}");
    }

    #[test]
    fn test_lopdf_rejects_garbage() {
        assert!(matches!(LopdfExtractor.extract(b"not a pdf"), Err(ExtractionError::Pdf(_))));
    }

    #[tokio::test]
    async fn test_stage_uses_text_side_cache() {
        let cache = Arc::new(MemoryCache::new());
        let paper = Paper::new("arxiv:1", "T", SourceKind::Arxiv).with_pdf_url("https://x/1.pdf");
        let key = CacheKey::for_paper(&paper);
        let pdf = cache.store(&key, EntryKind::Pdf, b"%PDF").await.unwrap();
        cache.store(&key, EntryKind::Text, b"cached text").await.unwrap();

        let stage = TextStage::new(cache.clone(), Arc::new(FixedExtractor("fresh text")));
        let report = stage.extract_all(vec![FetchedPaper { paper, pdf: Some(pdf) }]).await;

        let text_ref = report.items[0].text_path.clone().unwrap();
        assert_eq!(stage.read_text(&text_ref).await.unwrap(), "cached text");
        assert_eq!(cache.store_count(), 2);
    }

    #[tokio::test]
    async fn test_stage_records_failures_and_keeps_order() {
        let cache = Arc::new(MemoryCache::new());
        let with_pdf = Paper::new("a", "A", SourceKind::Arxiv).with_pdf_url("https://x/a.pdf");
        let key = CacheKey::for_paper(&with_pdf);
        let pdf = cache.store(&key, EntryKind::Pdf, b"garbage").await.unwrap();
        let without = Paper::new("b", "B", SourceKind::Arxiv);

        let stage = TextStage::new(cache, Arc::new(LopdfExtractor));
        let report = stage
            .extract_all(vec![
                FetchedPaper { paper: with_pdf, pdf: Some(pdf) },
                FetchedPaper { paper: without, pdf: None },
            ])
            .await;

        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].paper.id, "a");
        assert!(report.items[0].text_path.is_none());
        assert!(report.items[0].pdf.is_some());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].paper_id, "a");
    }
}
