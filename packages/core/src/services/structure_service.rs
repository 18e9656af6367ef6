//! Structure Service
//!
//! Entry point of the read path. Owns the store handle and every component
//! built on it; construct one per process and share it behind an `Arc`.
//!
//! # Examples
//!
//! ```no_run
//! # use structure_core::{DocumentMatch, StoreConfig, StructureService};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = StructureService::open(&StoreConfig::from_env()).await?;
//! let entry = service.get_entry(&DocumentMatch::Url("guide/intro".into()), None).await?;
//! println!("{} ({} items)", entry.title, entry.items.len());
//! # Ok(())
//! # }
//! ```

use crate::assembly::{process_toc, ItemAssembler};
use crate::config::StoreConfig;
use crate::db::{DatabaseError, DatabaseService};
use crate::models::{DocumentMatch, Entry, Menus, TocMenu, VersionId};
use crate::navigation::NavigationBuilder;
use crate::services::asset_repository::{AssetAddress, AssetRepository, ResolvedAsset};
use crate::services::blob_store::BlobStore;
use crate::services::document_resolver::DocumentResolver;
use crate::services::error::StoreError;
use crate::services::version_resolver::VersionResolver;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

pub struct StructureService {
    db: Arc<DatabaseService>,
    versions: VersionResolver,
    documents: DocumentResolver,
    assembler: ItemAssembler,
    assets: AssetRepository,
    navigation: NavigationBuilder,
}

impl StructureService {
    /// Open the store described by `config`, read-only
    ///
    /// # Errors
    ///
    /// `DatabaseError::StoreMissing` (with the resolved path) when the
    /// collector has not produced a store yet.
    pub async fn open(config: &StoreConfig) -> Result<Self, DatabaseError> {
        let db = Arc::new(DatabaseService::open_read_only(config.db_path()).await?);
        Ok(Self::from_database(db, config.blobs_root(), config.version_override).await)
    }

    /// Build the service on an already opened handle
    pub async fn from_database(
        db: Arc<DatabaseService>,
        blobs_root: impl Into<PathBuf>,
        version_override: Option<VersionId>,
    ) -> Self {
        let blobs = Arc::new(BlobStore::new(db.clone(), blobs_root));
        let versions = VersionResolver::new(db.clone(), version_override).await;

        tracing::info!(
            path = %db.db_path.display(),
            version = ?versions.current().await,
            "structure store opened"
        );

        Self {
            documents: DocumentResolver::new(db.clone()),
            assembler: ItemAssembler::new(blobs.clone()),
            assets: AssetRepository::new(db.clone(), blobs),
            navigation: NavigationBuilder::new(db.clone()),
            versions,
            db,
        }
    }

    pub fn database(&self) -> &DatabaseService {
        &self.db
    }

    /// Current version, as resolved at startup or by the last refresh
    pub async fn current_version(&self) -> Option<VersionId> {
        self.versions.current().await
    }

    /// Re-read the latest published version
    pub async fn refresh_version(&self) -> Option<VersionId> {
        self.versions.refresh().await
    }

    pub fn documents(&self) -> &DocumentResolver {
        &self.documents
    }

    pub fn assets(&self) -> &AssetRepository {
        &self.assets
    }

    /// Resolve and assemble one document
    ///
    /// Without an explicit `version` the current version is used as the hint.
    /// `found == false` when no document matches at any version.
    pub async fn get_entry(
        &self,
        key: &DocumentMatch,
        version: Option<VersionId>,
    ) -> Result<Entry, StoreError> {
        let hint = match version {
            Some(version) => Some(version),
            None => self.versions.current().await,
        };

        let Some(document) = self.documents.get(key, hint).await? else {
            tracing::debug!(column = key.column(), value = key.value(), "entry not found");
            return Ok(Entry::not_found());
        };

        let items = self
            .documents
            .items_for(&document.sid, Some(document.version_id))
            .await?;
        let assets = self
            .documents
            .assets_for_document(&document.uid, Some(document.version_id))
            .await?;

        let assembly = self
            .assembler
            .assemble(&items, &assets, &document.uid, document.path.as_deref())
            .await;

        let headings = match &document.toc {
            Some(toc) if !toc.is_empty() => toc.clone(),
            _ => assembly.headings,
        };

        Ok(Entry {
            found: true,
            title: document.title.clone(),
            headings,
            items: assembly.items,
            data: document.to_data(),
        })
    }

    /// In-page table of contents of an assembled entry
    pub fn toc(&self, entry: &Entry) -> TocMenu {
        process_toc(&entry.headings)
    }

    /// Top-level menu and section tree for a request path
    pub async fn menus(&self, pathname: &str) -> Result<Menus, StoreError> {
        let version = self.versions.current().await;
        self.navigation.build_menus(pathname, version).await
    }

    /// Short-link map: `sid -> url`
    pub async fn redirects(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(self
            .documents
            .all_documents()
            .await?
            .into_iter()
            .map(|summary| (summary.sid, summary.url))
            .collect())
    }

    /// Resolve an asset address against the current version
    pub async fn asset(&self, address: &AssetAddress) -> Result<Option<ResolvedAsset>, StoreError> {
        let current = self.versions.current().await;
        self.assets.resolve(address, current).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::BlobOptions;
    use crate::models::{AssetInfo, Heading, ItemContent, ItemRecord, RenderNode};
    use crate::services::test_support::{document, Fixture};
    use serde_json::json;

    async fn service(fx: &Fixture) -> StructureService {
        StructureService::open(&fx.config()).await.unwrap()
    }

    #[tokio::test]
    async fn test_open_missing_store_reports_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = StoreConfig::with_root(temp.path().join("absent"));
        let err = StructureService::open(&config).await.err().unwrap();
        assert!(err.to_string().contains("absent"));
    }

    #[tokio::test]
    async fn test_get_entry_assembles_document() {
        let fx = Fixture::new().await;
        let mut doc = document("guide/intro", 2);
        doc.title = "Intro".into();
        doc.meta_data.insert("title".into(), json!("ignored"));
        doc.meta_data.insert("summary".into(), json!("kept"));
        fx.add(&doc).await;

        let blob = fx.writer.put_blob(b"fn main() {}", &BlobOptions::inline()).await.unwrap();
        let mut asset = AssetInfo::new("guide.intro#code", "codeblock", blob.blob_uid.clone());
        asset.parent_doc_uid = Some(doc.uid.clone());
        asset.ext = Some("rs".into());
        fx.writer.insert_asset_info(&asset).await.unwrap();
        fx.writer.link_asset_version(&asset.uid, 2, &blob.blob_uid).await.unwrap();

        let items = [
            ItemContent::Heading { level: 1, text: "Setup".into() },
            ItemContent::Code { body: "![](asset:///guide.intro#code)".into() },
        ];
        for (i, content) in items.into_iter().enumerate() {
            fx.writer
                .insert_item(&ItemRecord::new(&doc.sid, 2, i as i64, content))
                .await
                .unwrap();
        }

        let service = service(&fx).await;
        assert_eq!(service.current_version().await, Some(2));

        let entry = service
            .get_entry(&DocumentMatch::Url("guide/intro".into()), None)
            .await
            .unwrap();

        assert!(entry.found);
        assert_eq!(entry.title, "Intro");
        assert_eq!(entry.data["title"], json!("Intro"));
        assert_eq!(entry.data["summary"], json!("kept"));
        assert_eq!(entry.headings[0].slug, "setup");
        assert!(matches!(
            entry.items[1].node(),
            Some(RenderNode::Code { value, .. }) if value == "fn main() {}"
        ));

        let toc = service.toc(&entry);
        assert!(toc.visible);
        assert_eq!(toc.items[0].link, "#setup");
    }

    #[tokio::test]
    async fn test_stored_toc_wins_over_assembled_headings() {
        let fx = Fixture::new().await;
        let mut doc = document("page", 1);
        doc.toc = Some(vec![Heading {
            label: "Stored".into(),
            slug: "stored".into(),
            ..Heading::default()
        }]);
        fx.add(&doc).await;
        fx.writer
            .insert_item(&ItemRecord::new(
                &doc.sid,
                1,
                0,
                ItemContent::Heading { level: 1, text: "Assembled".into() },
            ))
            .await
            .unwrap();

        let entry = service(&fx)
            .await
            .get_entry(&DocumentMatch::Uid("page".into()), None)
            .await
            .unwrap();
        assert_eq!(entry.headings.len(), 1);
        assert_eq!(entry.headings[0].label, "Stored");
    }

    #[tokio::test]
    async fn test_missing_entry_and_redirects() {
        let fx = Fixture::new().await;
        fx.add(&document("a", 1)).await;
        fx.add(&document("b/c", 1)).await;

        let service = service(&fx).await;
        let entry = service
            .get_entry(&DocumentMatch::Url("nope".into()), None)
            .await
            .unwrap();
        assert!(!entry.found);

        let redirects = service.redirects().await.unwrap();
        assert_eq!(redirects.get("sid-a").map(String::as_str), Some("a"));
        assert_eq!(redirects.get("sid-b.c").map(String::as_str), Some("b/c"));
    }
}
