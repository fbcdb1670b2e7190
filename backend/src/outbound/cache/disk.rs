//! Durable on-disk cache tier.
//!
//! One file per cache key under a configurable directory, created if
//! absent. Writes go to a temporary file in the same directory and are
//! atomically renamed into place, so a concurrent reader observes either
//! the old complete blob or the new complete blob, never a hybrid — even
//! when the triggering request is cancelled mid-write. Reads of a missing
//! file are a miss, not an error.
//!
//! No eviction is implemented: entries accumulate until removed out of
//! band. Unbounded growth is an operational gap inherited from the
//! original behaviour, not a policy choice made here.

use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::domain::place::CacheKey;
use crate::domain::ports::{GraphCache, GraphCacheError};

/// File extension for stored blobs.
const BLOB_EXTENSION: &str = "json";

/// Durable `GraphCache` backed by a local directory.
#[derive(Debug, Clone)]
pub struct DiskGraphCache {
    dir: PathBuf,
}

impl DiskGraphCache {
    /// Open (and create if absent) the cache directory.
    ///
    /// # Errors
    ///
    /// Propagates the I/O error when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path of the blob file for `key`.
    fn blob_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{key}.{BLOB_EXTENSION}"))
    }
}

fn read_blob(path: &Path) -> Result<Option<Vec<u8>>, GraphCacheError> {
    match std::fs::read(path) {
        Ok(blob) => Ok(Some(blob)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(error) => Err(GraphCacheError::backend(format!(
            "read {} failed: {error}",
            path.display()
        ))),
    }
}

fn write_blob_atomically(dir: &Path, path: &Path, blob: &[u8]) -> Result<(), GraphCacheError> {
    let map_err = |stage: &str, error: &dyn std::fmt::Display| {
        GraphCacheError::backend(format!("{stage} {} failed: {error}", path.display()))
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| map_err("create temp for", &e))?;
    tmp.write_all(blob).map_err(|e| map_err("write temp for", &e))?;
    tmp.flush().map_err(|e| map_err("flush temp for", &e))?;
    // Rename within the same directory keeps the replacement atomic.
    tmp.persist(path).map_err(|e| map_err("persist", &e))?;
    Ok(())
}

#[async_trait]
impl GraphCache for DiskGraphCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, GraphCacheError> {
        let path = self.blob_path(key);
        tokio::task::spawn_blocking(move || read_blob(&path))
            .await
            .map_err(|error| GraphCacheError::backend(format!("blocking read join: {error}")))?
    }

    async fn put(&self, key: &CacheKey, blob: &[u8]) -> Result<(), GraphCacheError> {
        let dir = self.dir.clone();
        let path = self.blob_path(key);
        let blob = blob.to_vec();
        tokio::task::spawn_blocking(move || write_blob_atomically(&dir, &path, &blob))
            .await
            .map_err(|error| GraphCacheError::backend(format!("blocking write join: {error}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    use crate::domain::place::PlaceQuery;

    fn key(name: &str) -> CacheKey {
        CacheKey::from_place(&PlaceQuery::new(name).expect("valid place"))
    }

    #[rstest]
    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempdir().expect("tempdir");
        let cache = DiskGraphCache::open(dir.path()).expect("open");

        cache
            .put(&key("Volgograd, Russia"), b"payload")
            .await
            .expect("put");
        let loaded = cache.get(&key("Volgograd, Russia")).await.expect("get");
        assert_eq!(loaded.as_deref(), Some(b"payload".as_slice()));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempdir().expect("tempdir");
        let cache = DiskGraphCache::open(dir.path()).expect("open");
        assert_eq!(cache.get(&key("Unseen City")).await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn put_replaces_the_previous_blob_wholesale() {
        let dir = tempdir().expect("tempdir");
        let cache = DiskGraphCache::open(dir.path()).expect("open");
        let k = key("Volgograd");

        cache.put(&k, b"first complete blob").await.expect("put");
        cache.put(&k, b"second").await.expect("put");
        let loaded = cache.get(&k).await.expect("get");
        assert_eq!(loaded.as_deref(), Some(b"second".as_slice()));
    }

    #[rstest]
    #[tokio::test]
    async fn writes_leave_no_temporary_files_behind() {
        let dir = tempdir().expect("tempdir");
        let cache = DiskGraphCache::open(dir.path()).expect("open");
        cache.put(&key("Volgograd"), b"payload").await.expect("put");

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("volgograd.json")]);
    }

    #[rstest]
    #[tokio::test]
    async fn open_creates_a_missing_directory() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("cache").join("city");
        let cache = DiskGraphCache::open(&nested).expect("open creates dirs");
        cache.put(&key("Volgograd"), b"payload").await.expect("put");
        assert!(nested.join("volgograd.json").exists());
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_reads_see_only_complete_blobs() {
        let dir = tempdir().expect("tempdir");
        let cache = DiskGraphCache::open(dir.path()).expect("open");
        let k = key("Volgograd");

        let old = vec![b'a'; 64 * 1024];
        let new = vec![b'b'; 64 * 1024];
        cache.put(&k, &old).await.expect("seed");

        let writer = {
            let cache = cache.clone();
            let k = k.clone();
            let new = new.clone();
            tokio::spawn(async move {
                for _ in 0..20 {
                    cache.put(&k, &new).await.expect("overwrite");
                }
            })
        };

        for _ in 0..50 {
            let blob = cache.get(&k).await.expect("get").expect("present");
            assert!(
                blob == old || blob == new,
                "reader observed a hybrid blob of {} bytes",
                blob.len()
            );
        }
        writer.await.expect("writer task");
    }
}
