//! Persistent content cache for PDFs and extracted text.
//!
//! Entries are addressed by [`CacheKey`] and [`EntryKind`]. A store writes to a
//! temporary file and renames it into place, so a concurrent reader sees
//! either no entry or a complete one.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::{CacheKey, ContentRef, EntryKind};

/// Keyed store for downloaded and derived content.
#[async_trait]
pub trait ContentCache: Send + Sync {
    /// Reference to a complete entry, if one exists.
    async fn lookup(&self, key: &CacheKey, kind: EntryKind) -> io::Result<Option<ContentRef>>;

    /// Store bytes under the key, replacing any previous entry.
    async fn store(&self, key: &CacheKey, kind: EntryKind, bytes: &[u8]) -> io::Result<ContentRef>;

    /// Read an entry's bytes.
    async fn load(&self, content: &ContentRef) -> io::Result<Vec<u8>>;
}

/// On-disk cache: `<root>/pdfs/<key>.pdf` and `<root>/txts/<key>.txt`.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    /// Cache rooted at `root` (created lazily).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final path of an entry.
    #[must_use]
    pub fn path_for(&self, key: &CacheKey, kind: EntryKind) -> PathBuf {
        self.root.join(kind.dir_name()).join(format!("{}.{}", key, kind.extension()))
    }

    /// Remove every cached PDF and text. Returns the number of files removed.
    pub async fn clear(&self) -> io::Result<usize> {
        let mut removed = 0;
        for kind in [EntryKind::Pdf, EntryKind::Text] {
            let dir = self.root.join(kind.dir_name());
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            while let Some(entry) = entries.next_entry().await? {
                if entry.file_type().await?.is_file() {
                    tokio::fs::remove_file(entry.path()).await?;
                    removed += 1;
                }
            }
        }
        info!(root = %self.root.display(), removed, "Cleared content cache");
        Ok(removed)
    }
}

#[async_trait]
impl ContentCache for DiskCache {
    async fn lookup(&self, key: &CacheKey, kind: EntryKind) -> io::Result<Option<ContentRef>> {
        let path = self.path_for(key, kind);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                Ok(Some(ContentRef { key: key.clone(), kind, location: path }))
            }
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn store(&self, key: &CacheKey, kind: EntryKind, bytes: &[u8]) -> io::Result<ContentRef> {
        let dir = self.root.join(kind.dir_name());
        tokio::fs::create_dir_all(&dir).await?;

        let final_path = self.path_for(key, kind);
        let tmp_path = dir.join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&tmp_path, bytes).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e);
        }

        debug!(key = %key, kind = ?kind, bytes = bytes.len(), "Stored cache entry");
        Ok(ContentRef { key: key.clone(), kind, location: final_path })
    }

    async fn load(&self, content: &ContentRef) -> io::Result<Vec<u8>> {
        tokio::fs::read(&content.location).await
    }
}

/// Volatile cache for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<(CacheKey, EntryKind), Vec<u8>>>,
    stores: AtomicUsize,
}

impl MemoryCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `store` calls so far.
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }

    /// Number of entries currently held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn reference(key: &CacheKey, kind: EntryKind) -> ContentRef {
        let location =
            PathBuf::from(format!("memory/{}/{}.{}", kind.dir_name(), key, kind.extension()));
        ContentRef { key: key.clone(), kind, location }
    }
}

#[async_trait]
impl ContentCache for MemoryCache {
    async fn lookup(&self, key: &CacheKey, kind: EntryKind) -> io::Result<Option<ContentRef>> {
        let found = self.entries.read().await.contains_key(&(key.clone(), kind));
        Ok(found.then(|| Self::reference(key, kind)))
    }

    async fn store(&self, key: &CacheKey, kind: EntryKind, bytes: &[u8]) -> io::Result<ContentRef> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        self.entries.write().await.insert((key.clone(), kind), bytes.to_vec());
        Ok(Self::reference(key, kind))
    }

    async fn load(&self, content: &ContentRef) -> io::Result<Vec<u8>> {
        self.entries
            .read()
            .await
            .get(&(content.key.clone(), content.kind))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such cache entry"))
    }
}
