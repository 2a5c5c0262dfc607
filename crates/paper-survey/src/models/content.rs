//! Cache keys and references to cached content.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::Paper;

/// Stable hash addressing a paper's cached PDF and extracted text.
///
/// Derived from the PDF URL when present, otherwise from the paper id, so two
/// records sharing a download URL share one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a paper.
    #[must_use]
    pub fn for_paper(paper: &Paper) -> Self {
        let mut hasher = Sha256::new();
        match paper.pdf_url.as_deref() {
            Some(url) => {
                hasher.update(b"url|");
                hasher.update(url.trim().as_bytes());
            }
            None => {
                hasher.update(b"id|");
                hasher.update(paper.id.as_bytes());
            }
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Raw downloaded PDF bytes.
    Pdf,
    /// UTF-8 text extracted from the PDF.
    Text,
}

impl EntryKind {
    /// Subdirectory holding entries of this kind.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Pdf => "pdfs",
            Self::Text => "txts",
        }
    }

    /// File extension for entries of this kind.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "txt",
        }
    }
}

/// Reference to a complete cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    /// Entry key.
    pub key: CacheKey,
    /// Entry kind.
    pub kind: EntryKind,
    /// Where the entry lives (a file path for the disk cache).
    pub location: PathBuf,
}

/// A ranked paper together with its cached PDF, if the download succeeded.
#[derive(Debug, Clone)]
pub struct FetchedPaper {
    /// The ranked record.
    pub paper: Paper,
    /// Cached PDF reference.
    pub pdf: Option<ContentRef>,
}
