//! Blob Store
//!
//! Content-addressed payload loading for the read path.
//!
//! # Resolution
//!
//! 1. The `blob_store` record is looked up by `blob_uid` (cached, hits and misses alike)
//! 2. Inline `payload` bytes win
//! 3. Otherwise `path` + `hash` locate `<blobs-root>/<path>/<hash>`; a missing or
//!    unreadable file means the blob is absent. Leading slashes in `path` are
//!    ignored and a `..` component makes the blob absent, so reads never leave
//!    the blobs root
//! 4. If `compression` is set the bytes are gunzipped; a bad stream is
//!    [`BlobError::Corrupt`], never "absent" and never the raw bytes
//!
//! # Cache
//!
//! The cache maps `blob_uid -> Option<record>` and lives as long as the
//! `BlobStore` value. It sits behind a `RwLock` so concurrent requests can
//! read and insert safely.

use crate::db::DatabaseService;
use crate::models::BlobRecord;
use crate::services::error::{BlobError, StoreError};
use crate::services::row;
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct BlobStore {
    db: Arc<DatabaseService>,
    blobs_root: PathBuf,
    cache: RwLock<HashMap<String, Option<Arc<BlobRecord>>>>,
}

impl BlobStore {
    /// Create a blob store reading overflow files under `blobs_root`
    pub fn new(db: Arc<DatabaseService>, blobs_root: impl Into<PathBuf>) -> Self {
        Self {
            db,
            blobs_root: blobs_root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn blobs_root(&self) -> &Path {
        &self.blobs_root
    }

    /// Look up the record for `blob_uid`, consulting the cache first
    pub async fn record(&self, blob_uid: &str) -> Result<Option<Arc<BlobRecord>>, BlobError> {
        if let Some(cached) = self.cache.read().await.get(blob_uid) {
            return Ok(cached.clone());
        }

        let record = self.fetch_record(blob_uid).await?.map(Arc::new);

        self.cache
            .write()
            .await
            .insert(blob_uid.to_string(), record.clone());

        Ok(record)
    }

    /// Load the decoded bytes of a blob
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` - plaintext payload
    /// - `Ok(None)` - no such record, or its overflow file is missing/unreadable
    /// - `Err(BlobError::Corrupt)` - the payload failed to decompress
    pub async fn load(&self, blob_uid: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let Some(record) = self.record(blob_uid).await? else {
            tracing::debug!(%blob_uid, "blob record not found");
            return Ok(None);
        };

        let raw = match (&record.payload, &record.path, &record.hash) {
            (Some(payload), _, _) => payload.clone(),
            (None, Some(path), Some(hash)) => {
                let Some(file) = self.overflow_path(path, hash) else {
                    tracing::warn!(%blob_uid, %path, "overflow path escapes the blobs root");
                    return Ok(None);
                };
                match tokio::fs::read(&file).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::debug!(
                            %blob_uid,
                            path = %file.display(),
                            error = %e,
                            "overflow blob unreadable"
                        );
                        return Ok(None);
                    }
                }
            }
            _ => return Ok(None),
        };

        if record.compression {
            return gunzip(blob_uid, &raw).map(Some);
        }
        Ok(Some(raw))
    }

    /// Number of cached lookups (hits and misses)
    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }

    fn overflow_path(&self, path: &str, hash: &str) -> Option<PathBuf> {
        let mut file = self.blobs_root.clone();
        for component in Path::new(path).components().chain(Path::new(hash).components()) {
            match component {
                Component::Normal(part) => file.push(part),
                Component::ParentDir => return None,
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }
        Some(file)
    }

    async fn fetch_record(&self, blob_uid: &str) -> Result<Option<BlobRecord>, BlobError> {
        self.db
            .fetch_one(
                "blob_store",
                "SELECT blob_uid, hash, path, payload, compression, size FROM blob_store WHERE blob_uid = ?",
                [blob_uid],
                row_to_blob,
            )
            .await
            .map_err(|e| match e {
                StoreError::Database(db) => BlobError::Database(db),
                other => BlobError::corrupt(blob_uid, other.to_string()),
            })
    }
}

fn row_to_blob(row: &libsql::Row) -> Result<BlobRecord, StoreError> {
    Ok(BlobRecord {
        blob_uid: row::text(row, 0, "blob_uid")?,
        hash: row::opt_text(row, 1, "hash")?,
        path: row::opt_text(row, 2, "path")?,
        payload: row::opt_bytes(row, 3, "payload")?,
        compression: row::flag(row, 4, "compression")?,
        size: row::opt_int(row, 5, "size")?,
    })
}

fn gunzip(blob_uid: &str, bytes: &[u8]) -> Result<Vec<u8>, BlobError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| BlobError::corrupt(blob_uid, format!("gzip: {}", e)))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::BlobOptions;
    use crate::services::test_support::Fixture;

    #[tokio::test]
    async fn test_inline_payload() {
        let fx = Fixture::new().await;
        let stored = fx.writer.put_blob(b"hello", &BlobOptions::inline()).await.unwrap();

        let store = BlobStore::new(fx.reader().await, fx.blobs_root());
        assert_eq!(store.load(&stored.blob_uid).await.unwrap().unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_compressed_overflow_payload() {
        let fx = Fixture::new().await;
        let body = "x".repeat(4096);
        let stored = fx
            .writer
            .put_blob(body.as_bytes(), &BlobOptions::overflow("big").with_compression())
            .await
            .unwrap();

        let store = BlobStore::new(fx.reader().await, fx.blobs_root());
        let bytes = store.load(&stored.blob_uid).await.unwrap().unwrap();
        assert_eq!(bytes, body.as_bytes());
    }

    #[tokio::test]
    async fn test_missing_record_and_missing_file_are_absent() {
        let fx = Fixture::new().await;
        let stored = fx
            .writer
            .put_blob(b"on disk", &BlobOptions::overflow("gone"))
            .await
            .unwrap();
        std::fs::remove_dir_all(fx.blobs_root().join("gone")).unwrap();

        let store = BlobStore::new(fx.reader().await, fx.blobs_root());
        assert!(store.load("999").await.unwrap().is_none());
        assert!(store.load(&stored.blob_uid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_absolute_overflow_path_stays_under_blobs_root() {
        let fx = Fixture::new().await;
        let stored = fx
            .writer
            .put_blob(b"sharded", &BlobOptions::overflow("shard"))
            .await
            .unwrap();
        fx.exec(&format!(
            "UPDATE blob_store SET path = '/shard' WHERE blob_uid = '{}'",
            stored.blob_uid
        ))
        .await;

        let store = BlobStore::new(fx.reader().await, fx.blobs_root());
        assert_eq!(store.load(&stored.blob_uid).await.unwrap().unwrap(), b"sharded");
    }

    #[tokio::test]
    async fn test_parent_dir_overflow_path_is_absent() {
        let fx = Fixture::new().await;
        let stored = fx
            .writer
            .put_blob(b"inside", &BlobOptions::overflow("shard"))
            .await
            .unwrap();
        std::fs::write(fx.temp.path().join(&stored.hash), b"outside").unwrap();
        fx.exec(&format!(
            "UPDATE blob_store SET path = '..' WHERE blob_uid = '{}'",
            stored.blob_uid
        ))
        .await;

        let store = BlobStore::new(fx.reader().await, fx.blobs_root());
        assert!(store.load(&stored.blob_uid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bad_gzip_is_corrupt_not_absent() {
        let fx = Fixture::new().await;
        fx.exec(
            "INSERT INTO blob_store (blob_uid, hash, payload, compression, size)
             VALUES ('7', 'deadbeef', X'00010203', 1, 4)",
        )
        .await;

        let store = BlobStore::new(fx.reader().await, fx.blobs_root());
        let err = store.load("7").await.unwrap_err();
        assert!(err.is_corrupt(), "expected corrupt, got {err:?}");
    }

    #[tokio::test]
    async fn test_cache_remembers_hits_and_misses() {
        let fx = Fixture::new().await;
        let stored = fx.writer.put_blob(b"cached", &BlobOptions::inline()).await.unwrap();

        let store = BlobStore::new(fx.reader().await, fx.blobs_root());
        store.load(&stored.blob_uid).await.unwrap();
        store.load(&stored.blob_uid).await.unwrap();
        store.load("404").await.unwrap();
        assert_eq!(store.cached_len().await, 2);
    }
}
