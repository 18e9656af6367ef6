//! Fixture stores for unit tests

use crate::config::StoreConfig;
use crate::db::{DatabaseService, StructureWriter};
use crate::models::{Document, VersionId};
use serde_json::Map;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// A writable store in a temp dir plus a writer bound to it
pub(crate) struct Fixture {
    pub temp: TempDir,
    pub db: Arc<DatabaseService>,
    pub writer: StructureWriter,
}

impl Fixture {
    pub async fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let config = StoreConfig::with_root(temp.path());
        let db = Arc::new(DatabaseService::create(config.db_path()).await.unwrap());
        let writer = StructureWriter::new(db.clone(), config.blobs_root());
        Self { temp, db, writer }
    }

    pub fn config(&self) -> StoreConfig {
        StoreConfig::with_root(self.temp.path())
    }

    pub fn blobs_root(&self) -> PathBuf {
        self.config().blobs_root()
    }

    /// Read-only handle on the same file, as the serving process would open it
    pub async fn reader(&self) -> Arc<DatabaseService> {
        Arc::new(
            DatabaseService::open_read_only(self.config().db_path())
                .await
                .unwrap(),
        )
    }

    /// Execute raw SQL against the writable handle
    pub async fn exec(&self, sql: &str) {
        let conn = self.db.connect_with_timeout().await.unwrap();
        conn.execute(sql, ()).await.unwrap();
    }

    pub async fn add(&self, doc: &Document) {
        self.writer.insert_document(doc).await.unwrap();
    }
}

/// Minimal document at `url`, uid derived from the url
pub(crate) fn document(url: &str, version_id: VersionId) -> Document {
    let uid = if url.is_empty() { "index".to_string() } else { url.replace('/', ".") };
    Document {
        sid: format!("sid-{}", uid),
        uid,
        url: url.to_string(),
        version_id,
        title: url.rsplit('/').next().unwrap_or(url).to_string(),
        level: url.split('/').filter(|s| !s.is_empty()).count() as i64,
        order: 0,
        path: Some(format!("{}.md", if url.is_empty() { "index" } else { url })),
        tags: Vec::new(),
        meta_data: Map::new(),
        format: "markdown".to_string(),
        toc: None,
    }
}
