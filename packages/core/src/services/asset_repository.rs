//! Asset Repository
//!
//! Resolves an asset address to its metadata and decoded payload.
//!
//! # Addresses
//!
//! - `<assetUid>` - the asset as bound to the current version; the response
//!   may change when a new version is published
//! - `<blobUid>:<assetUid>` - one specific blob; immutable, safe to cache forever.
//!   Blob uids are hex counters, so a prefix that is not hex belongs to a bare
//!   uid that happens to contain `:`

use crate::db::DatabaseService;
use crate::models::{AssetInfo, VersionId};
use crate::services::blob_store::BlobStore;
use crate::services::document_resolver::row_to_asset;
use crate::services::error::StoreError;
use crate::services::row;
use std::sync::Arc;

const ASSET_COLUMNS: &str = "uid, type, blob_uid, parent_doc_uid, path, ext, params, title";

/// A parsed asset address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetAddress {
    /// Bare asset uid, resolved through the current version
    Current(String),
    /// Asset uid pinned to one blob
    Pinned { blob_uid: String, asset_uid: String },
}

impl AssetAddress {
    /// Parse `<assetUid>` or `<blobUid>:<assetUid>`
    ///
    /// Only the first `:` separates. The address is pinned when the part
    /// before it is a non-empty run of hex digits and the part after it is
    /// non-empty.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim_start_matches('/');
        match raw.split_once(':') {
            Some((blob_uid, asset_uid)) if is_blob_uid(blob_uid) && !asset_uid.is_empty() => {
                AssetAddress::Pinned {
                    blob_uid: blob_uid.to_string(),
                    asset_uid: asset_uid.to_string(),
                }
            }
            _ => AssetAddress::Current(raw.to_string()),
        }
    }

    pub fn asset_uid(&self) -> &str {
        match self {
            AssetAddress::Current(uid) => uid,
            AssetAddress::Pinned { asset_uid, .. } => asset_uid,
        }
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, AssetAddress::Pinned { .. })
    }
}

/// Asset metadata plus its decoded bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub info: AssetInfo,
    pub bytes: Vec<u8>,

    /// Resolved through a pinned address
    pub pinned: bool,
}

pub struct AssetRepository {
    db: Arc<DatabaseService>,
    blobs: Arc<BlobStore>,
}

impl AssetRepository {
    pub fn new(db: Arc<DatabaseService>, blobs: Arc<BlobStore>) -> Self {
        Self { db, blobs }
    }

    /// First `asset_info` row for a uid, any blob
    pub async fn info(&self, asset_uid: &str) -> Result<Option<AssetInfo>, StoreError> {
        let sql = format!("SELECT {} FROM asset_info WHERE uid = ? LIMIT 1", ASSET_COLUMNS);
        self.db
            .fetch_one("asset_info", &sql, [asset_uid], row_to_asset)
            .await
    }

    /// `asset_info` row for one `(uid, blob_uid)` pair
    pub async fn info_pinned(
        &self,
        asset_uid: &str,
        blob_uid: &str,
    ) -> Result<Option<AssetInfo>, StoreError> {
        let sql = format!(
            "SELECT {} FROM asset_info WHERE uid = ? AND blob_uid = ? LIMIT 1",
            ASSET_COLUMNS
        );
        self.db
            .fetch_one("asset_info", &sql, [asset_uid, blob_uid], row_to_asset)
            .await
    }

    /// Blob bound to an asset, at `version` or at the highest bound version
    pub async fn latest_blob_uid(
        &self,
        asset_uid: &str,
        version: Option<VersionId>,
    ) -> Result<Option<String>, StoreError> {
        let blob_uid = match version {
            Some(version) => {
                self.db
                    .fetch_one(
                        "asset_blob",
                        "SELECT blob_uid FROM assets WHERE asset_uid = ? AND version_id = ?
                         ORDER BY version_id DESC LIMIT 1",
                        libsql::params![asset_uid, version],
                        blob_uid_column,
                    )
                    .await?
            }
            None => {
                self.db
                    .fetch_one(
                        "asset_blob",
                        "SELECT blob_uid FROM assets WHERE asset_uid = ?
                         ORDER BY version_id DESC LIMIT 1",
                        [asset_uid],
                        blob_uid_column,
                    )
                    .await?
            }
        };

        Ok(blob_uid.flatten())
    }

    /// Asset and bytes as bound to exactly `version`
    pub async fn asset_with_blob_for_version(
        &self,
        asset_uid: &str,
        version: VersionId,
    ) -> Result<Option<ResolvedAsset>, StoreError> {
        let Some(blob_uid) = self.latest_blob_uid(asset_uid, Some(version)).await? else {
            return Ok(None);
        };
        self.load(asset_uid, &blob_uid, false).await
    }

    /// Asset and bytes for one specific blob
    pub async fn asset_with_blob_pinned(
        &self,
        asset_uid: &str,
        blob_uid: &str,
    ) -> Result<Option<ResolvedAsset>, StoreError> {
        self.load(asset_uid, blob_uid, true).await
    }

    /// Resolve an address against the current version
    ///
    /// A bare uid with no binding at `current` falls back to the most recent
    /// binding of any version, and finally to any `asset_info` row.
    pub async fn resolve(
        &self,
        address: &AssetAddress,
        current: Option<VersionId>,
    ) -> Result<Option<ResolvedAsset>, StoreError> {
        let asset_uid = match address {
            AssetAddress::Pinned {
                blob_uid,
                asset_uid,
            } => return self.asset_with_blob_pinned(asset_uid, blob_uid).await,
            AssetAddress::Current(asset_uid) => asset_uid.as_str(),
        };

        if let Some(version) = current {
            if let Some(found) = self.asset_with_blob_for_version(asset_uid, version).await? {
                return Ok(Some(found));
            }
        }

        if let Some(blob_uid) = self.latest_blob_uid(asset_uid, None).await? {
            tracing::debug!(%asset_uid, %blob_uid, ?current, "asset resolved through latest binding");
            return self.load(asset_uid, &blob_uid, false).await;
        }

        let Some(info) = self.info(asset_uid).await? else {
            return Ok(None);
        };
        let blob_uid = info.blob_uid.clone();
        self.with_bytes(info, &blob_uid, false).await
    }

    async fn load(
        &self,
        asset_uid: &str,
        blob_uid: &str,
        pinned: bool,
    ) -> Result<Option<ResolvedAsset>, StoreError> {
        let Some(info) = self.info_pinned(asset_uid, blob_uid).await? else {
            tracing::debug!(%asset_uid, %blob_uid, "no asset_info for blob binding");
            return Ok(None);
        };
        self.with_bytes(info, blob_uid, pinned).await
    }

    async fn with_bytes(
        &self,
        info: AssetInfo,
        blob_uid: &str,
        pinned: bool,
    ) -> Result<Option<ResolvedAsset>, StoreError> {
        Ok(self.blobs.load(blob_uid).await?.map(|bytes| ResolvedAsset {
            info,
            bytes,
            pinned,
        }))
    }
}

fn is_blob_uid(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

fn blob_uid_column(row: &libsql::Row) -> Result<Option<String>, StoreError> {
    row::opt_text(row, 0, "blob_uid")
}
