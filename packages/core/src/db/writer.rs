//! Producer-side writer
//!
//! The collector owns the write path; this writer implements just enough of
//! its contract for fixtures, tests and small import tools:
//!
//! - Blobs are deduplicated by content digest: for any hash there is at most
//!   one `blob_store` row, and every asset pointing at identical bytes shares
//!   its `blob_uid`.
//! - `blob_uid`s are a lowercase hex counter: the successor of the largest
//!   existing key read as hex. Keys that are not hex are skipped.
//! - Blobs are optionally gzip'd and optionally written to
//!   `<blobs-root>/<path>/<hash>` instead of inline.
//!
//! There is no transaction design here: rows are inserted one statement at a
//! time and a version is expected to be published only once complete.

use crate::db::{DatabaseError, DatabaseService};
use crate::models::{AssetInfo, Document, ItemContent, ItemRecord, VersionId};
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha512};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Where and how a blob's bytes are stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobOptions {
    /// gzip the stored bytes
    pub compress: bool,

    /// Store on the filesystem under this relative directory instead of inline
    pub overflow_dir: Option<String>,
}

impl BlobOptions {
    pub fn inline() -> Self {
        Self::default()
    }

    pub fn compressed() -> Self {
        Self {
            compress: true,
            overflow_dir: None,
        }
    }

    pub fn overflow(dir: impl Into<String>) -> Self {
        Self {
            compress: false,
            overflow_dir: Some(dir.into()),
        }
    }

    pub fn with_compression(mut self) -> Self {
        self.compress = true;
        self
    }
}

/// Result of [`StructureWriter::put_blob`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub blob_uid: String,
    pub hash: String,

    /// False when an existing record with the same hash was reused
    pub created: bool,
}

/// Writes collector-shaped rows into a writable store
pub struct StructureWriter {
    db: Arc<DatabaseService>,
    blobs_root: PathBuf,
}

/// Hex SHA-512 of a payload, the dedup key of `blob_store`
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha512::digest(bytes))
}

impl StructureWriter {
    pub fn new(db: Arc<DatabaseService>, blobs_root: impl Into<PathBuf>) -> Self {
        Self {
            db,
            blobs_root: blobs_root.into(),
        }
    }

    /// Record a published version
    pub async fn record_version(&self, version_id: VersionId) -> Result<(), DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        conn.execute(
            "INSERT OR IGNORE INTO versions (version_id) VALUES (?)",
            [version_id],
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to record version: {}", e)))?;
        Ok(())
    }

    /// Insert a document row, encoding its JSON columns
    pub async fn insert_document(&self, doc: &Document) -> Result<(), DatabaseError> {
        let tags = encode_json(&doc.tags)?;
        let meta = encode_json(&doc.meta_data)?;
        let toc = doc.toc.as_ref().map(encode_json).transpose()?;

        let conn = self.db.connect_with_timeout().await?;
        conn.execute(
            r#"INSERT INTO documents (uid, sid, url, version_id, title, level, "order", path, tags, meta_data, format, toc)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            libsql::params![
                doc.uid.as_str(),
                doc.sid.as_str(),
                doc.url.as_str(),
                doc.version_id,
                doc.title.as_str(),
                doc.level,
                doc.order,
                doc.path.as_deref(),
                tags,
                meta,
                doc.format.as_str(),
                toc,
            ],
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to insert document {}: {}", doc.uid, e))
        })?;
        Ok(())
    }

    /// Insert one item row
    pub async fn insert_item(&self, item: &ItemRecord) -> Result<(), DatabaseError> {
        let (level, body) = match &item.content {
            ItemContent::Heading { level, text } => (Some(i64::from(*level)), text.as_str()),
            ItemContent::Paragraph { text } => (None, text.as_str()),
            ItemContent::Image { body }
            | ItemContent::Code { body }
            | ItemContent::Link { body }
            | ItemContent::Table { body }
            | ItemContent::Other { body, .. } => (None, body.as_str()),
        };

        let conn = self.db.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO items (doc_sid, version_id, type, level, order_index, body_text, ast)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            libsql::params![
                item.doc_sid.as_str(),
                item.version_id,
                item.content.type_name(),
                level,
                item.order_index,
                body,
                item.ast.as_deref(),
            ],
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to insert item {}/{}: {}",
                item.doc_sid, item.order_index, e
            ))
        })?;
        Ok(())
    }

    /// Insert an asset pointer
    pub async fn insert_asset_info(&self, asset: &AssetInfo) -> Result<(), DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        conn.execute(
            "INSERT OR IGNORE INTO asset_info (uid, type, blob_uid, parent_doc_uid, path, ext, params, title)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            libsql::params![
                asset.uid.as_str(),
                asset.asset_type.as_str(),
                asset.blob_uid.as_str(),
                asset.parent_doc_uid.as_deref(),
                asset.path.as_deref(),
                asset.ext.as_deref(),
                asset.params.as_deref(),
                asset.title.as_deref(),
            ],
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to insert asset {}: {}", asset.uid, e))
        })?;
        Ok(())
    }

    /// Bind an asset uid to a blob for one version
    pub async fn link_asset_version(
        &self,
        asset_uid: &str,
        version_id: VersionId,
        blob_uid: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        conn.execute(
            "INSERT OR REPLACE INTO assets (asset_uid, version_id, blob_uid) VALUES (?, ?, ?)",
            libsql::params![asset_uid, version_id, blob_uid],
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to link asset {}: {}", asset_uid, e))
        })?;
        Ok(())
    }

    /// Store a payload, reusing the existing record when the content is known
    ///
    /// # Returns
    ///
    /// The blob uid to reference from `asset_info`, and whether a new record
    /// was written.
    pub async fn put_blob(
        &self,
        bytes: &[u8],
        options: &BlobOptions,
    ) -> Result<StoredBlob, DatabaseError> {
        let hash = content_hash(bytes);

        if let Some(blob_uid) = self
            .db
            .fetch_one(
                "blob_by_hash",
                "SELECT blob_uid FROM blob_store WHERE hash = ?",
                [hash.as_str()],
                |row| row.get::<String>(0).map_err(DatabaseError::LibsqlError),
            )
            .await?
        {
            tracing::debug!(%blob_uid, %hash, "blob content already stored");
            return Ok(StoredBlob {
                blob_uid,
                hash,
                created: false,
            });
        }

        let blob_uid = self.next_blob_uid().await?;

        let stored = if options.compress {
            gzip(bytes)?
        } else {
            bytes.to_vec()
        };

        let payload = match &options.overflow_dir {
            Some(dir) => {
                let dir_path = self.blobs_root.join(dir);
                tokio::fs::create_dir_all(&dir_path).await?;
                tokio::fs::write(dir_path.join(&hash), &stored).await?;
                None
            }
            None => Some(stored),
        };

        let conn = self.db.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO blob_store (blob_uid, hash, path, payload, compression, size)
             VALUES (?, ?, ?, ?, ?, ?)",
            libsql::params![
                blob_uid.as_str(),
                hash.as_str(),
                options.overflow_dir.as_deref(),
                payload,
                i64::from(options.compress),
                bytes.len() as i64,
            ],
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to insert blob {}: {}", blob_uid, e))
        })?;

        Ok(StoredBlob {
            blob_uid,
            hash,
            created: true,
        })
    }

    async fn next_blob_uid(&self) -> Result<String, DatabaseError> {
        let keys = self
            .db
            .fetch_all(
                "next_blob_uid",
                "SELECT blob_uid FROM blob_store",
                (),
                blob_key,
            )
            .await?;

        let current = keys
            .iter()
            .flatten()
            .filter_map(|key| u64::from_str_radix(key.trim(), 16).ok())
            .max()
            .unwrap_or(0);
        Ok(format!("{:x}", current + 1))
    }
}

fn blob_key(row: &libsql::Row) -> Result<Option<String>, DatabaseError> {
    Ok(match row.get_value(0).map_err(DatabaseError::LibsqlError)? {
        libsql::Value::Text(key) => Some(key),
        libsql::Value::Integer(n) => Some(n.to_string()),
        _ => None,
    })
}

fn encode_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value)
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to encode JSON column: {}", e)))
}

fn gzip(bytes: &[u8]) -> Result<Vec<u8>, DatabaseError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}
