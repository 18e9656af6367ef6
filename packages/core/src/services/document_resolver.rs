//! Document Resolver
//!
//! Looks up documents, their items and their assets with version fallback.
//!
//! # Version Fallback
//!
//! With a version hint the exact `(key, version_id)` row is tried first; when
//! it does not exist the highest version for the key is used instead. Without
//! a hint the highest version wins directly. The same rule applies to items:
//! a document whose hinted version has no item rows falls back to the latest
//! version that has any.
//!
//! JSON columns never fail a lookup. Malformed `tags`, `meta_data` or `toc`
//! decode to empty defaults and are logged.

use crate::db::DatabaseService;
use crate::models::{
    AssetInfo, Document, DocumentMatch, DocumentSummary, Heading, ItemContent, ItemRecord,
    VersionId,
};
use crate::services::error::StoreError;
use crate::services::row;
use serde::de::DeserializeOwned;
use serde_json::Map;
use std::collections::HashMap;
use std::sync::Arc;

const DOCUMENT_COLUMNS: &str =
    r#"uid, sid, url, version_id, title, level, "order", path, tags, meta_data, format, toc"#;

/// Default `format` when the store leaves it unset
pub const DEFAULT_FORMAT: &str = "markdown";

pub struct DocumentResolver {
    db: Arc<DatabaseService>,
}

impl DocumentResolver {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Find a document by uid, sid or url
    ///
    /// # Returns
    ///
    /// - `Ok(Some(doc))` - exact version match, or the latest version of the key
    /// - `Ok(None)` - no row for the key at any version
    pub async fn get(
        &self,
        key: &DocumentMatch,
        version: Option<VersionId>,
    ) -> Result<Option<Document>, StoreError> {
        if let Some(version) = version {
            let sql = format!(
                "SELECT {} FROM documents WHERE {} = ? AND version_id = ? LIMIT 1",
                DOCUMENT_COLUMNS,
                key.column()
            );
            if let Some(doc) = self
                .db
                .fetch_one(
                    "document",
                    &sql,
                    libsql::params![key.value(), version],
                    row_to_document,
                )
                .await?
            {
                return Ok(Some(doc));
            }
            tracing::debug!(
                column = key.column(),
                value = key.value(),
                version,
                "no document at requested version, falling back to latest"
            );
        }

        let sql = format!(
            "SELECT {} FROM documents WHERE {} = ? ORDER BY version_id DESC LIMIT 1",
            DOCUMENT_COLUMNS,
            key.column()
        );
        self.db
            .fetch_one("document", &sql, [key.value()], row_to_document)
            .await
    }

    /// Items of a document, ordered by `order_index`
    pub async fn items_for(
        &self,
        doc_sid: &str,
        version: Option<VersionId>,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        if let Some(version) = version {
            let items = self.items_at(doc_sid, version).await?;
            if !items.is_empty() {
                return Ok(items);
            }
        }

        let latest = self
            .db
            .fetch_one(
                "latest_items_version",
                "SELECT MAX(version_id) FROM items WHERE doc_sid = ?",
                [doc_sid],
                |row| row::opt_int(row, 0, "version_id"),
            )
            .await?
            .flatten();

        match latest {
            Some(latest) if Some(latest) != version => {
                tracing::debug!(%doc_sid, ?version, latest, "items taken from latest version");
                self.items_at(doc_sid, latest).await
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn items_at(
        &self,
        doc_sid: &str,
        version: VersionId,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        self.db
            .fetch_all(
                "items",
                "SELECT type, level, order_index, body_text, ast FROM items
                 WHERE doc_sid = ? AND version_id = ?
                 ORDER BY order_index",
                libsql::params![doc_sid, version],
                |row| {
                    let type_name = row::opt_text(row, 0, "type")?.unwrap_or_default();
                    let content = ItemContent::from_columns(
                        &type_name,
                        row::opt_int(row, 1, "level")?,
                        row::opt_text(row, 3, "body_text")?,
                    );
                    Ok(ItemRecord {
                        doc_sid: doc_sid.to_string(),
                        version_id: version,
                        order_index: row::int(row, 2, "order_index")?,
                        content,
                        ast: row::opt_text(row, 4, "ast")?.filter(|a| !a.trim().is_empty()),
                    })
                },
            )
            .await
    }

    /// Assets owned by a document, keyed by asset uid
    ///
    /// An asset bound to several blobs across versions resolves to the binding
    /// for `version` when one exists, else to the highest bound version. Asset
    /// rows with no version binding at all are kept as a last resort.
    pub async fn assets_for_document(
        &self,
        doc_uid: &str,
        version: Option<VersionId>,
    ) -> Result<HashMap<String, AssetInfo>, StoreError> {
        let rows = self
            .db
            .fetch_all(
                "document_assets",
                "SELECT ai.uid, ai.type, ai.blob_uid, ai.parent_doc_uid, ai.path, ai.ext, ai.params, ai.title,
                        a.version_id
                 FROM asset_info ai
                 LEFT JOIN assets a ON a.asset_uid = ai.uid AND a.blob_uid = ai.blob_uid
                 WHERE ai.parent_doc_uid = ?",
                [doc_uid],
                |row| Ok::<_, StoreError>((row_to_asset(row)?, row::opt_int(row, 8, "version_id")?)),
            )
            .await?;

        let mut chosen: HashMap<String, (Rank, AssetInfo)> = HashMap::new();
        for (info, bound) in rows {
            let rank = Rank::of(bound, version);

            match chosen.get(&info.uid) {
                Some((current, _)) if *current >= rank => {}
                _ => {
                    chosen.insert(info.uid.clone(), (rank, info));
                }
            }
        }

        Ok(chosen
            .into_iter()
            .map(|(uid, (_, info))| (uid, info))
            .collect())
    }

    /// Every `(sid, url)` pair, one per url at its latest version
    pub async fn all_documents(&self) -> Result<Vec<DocumentSummary>, StoreError> {
        self.db
            .fetch_all(
                "document_summaries",
                "SELECT d.sid, d.url FROM documents d
                 WHERE d.version_id = (SELECT MAX(version_id) FROM documents WHERE url = d.url)
                 ORDER BY d.url",
                (),
                |row| {
                    Ok(DocumentSummary {
                        sid: row::text(row, 0, "sid")?,
                        url: row::text(row, 1, "url")?,
                    })
                },
            )
            .await
    }
}

/// Preference order for an asset's version bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Unbound,
    Other(VersionId),
    Exact,
}

impl Rank {
    fn of(bound: Option<VersionId>, wanted: Option<VersionId>) -> Self {
        match bound {
            None => Rank::Unbound,
            Some(v) if Some(v) == wanted => Rank::Exact,
            Some(v) => Rank::Other(v),
        }
    }
}

pub(crate) fn row_to_asset(row: &libsql::Row) -> Result<AssetInfo, StoreError> {
    Ok(AssetInfo {
        uid: row::text(row, 0, "uid")?,
        asset_type: row::opt_text(row, 1, "type")?.unwrap_or_default(),
        blob_uid: row::text(row, 2, "blob_uid")?,
        parent_doc_uid: row::opt_text(row, 3, "parent_doc_uid")?,
        path: row::opt_text(row, 4, "path")?,
        ext: row::opt_text(row, 5, "ext")?,
        params: row::opt_text(row, 6, "params")?,
        title: row::opt_text(row, 7, "title")?,
    })
}

fn row_to_document(row: &libsql::Row) -> Result<Document, StoreError> {
    let uid = row::text(row, 0, "uid")?;

    let tags: Vec<String> =
        decode_json(&uid, "tags", row::opt_text(row, 8, "tags")?).unwrap_or_default();
    let meta_data: Map<String, serde_json::Value> =
        decode_json(&uid, "meta_data", row::opt_text(row, 9, "meta_data")?).unwrap_or_default();
    let toc: Option<Vec<Heading>> = decode_json(&uid, "toc", row::opt_text(row, 11, "toc")?);

    let format = row::opt_text(row, 10, "format")?
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string());

    Ok(Document {
        sid: row::text(row, 1, "sid")?,
        url: row::text(row, 2, "url")?,
        version_id: row::int(row, 3, "version_id")?,
        title: row::opt_text(row, 4, "title")?.unwrap_or_default(),
        level: row::opt_int(row, 5, "level")?.unwrap_or(0),
        order: row::opt_int(row, 6, "order")?.unwrap_or(0),
        path: row::opt_text(row, 7, "path")?,
        tags,
        meta_data,
        format,
        toc,
        uid,
    })
}

/// Decode a JSON column; NULL, blank and malformed values all yield `None`
fn decode_json<T: DeserializeOwned>(uid: &str, column: &str, raw: Option<String>) -> Option<T> {
    let raw = raw.filter(|r| !r.trim().is_empty())?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(%uid, column, error = %e, "malformed JSON column, using default");
            None
        }
    }
}
