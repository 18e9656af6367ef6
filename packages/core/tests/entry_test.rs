//! Integration tests for entry assembly through the public API
//!
//! Tests cover:
//! - Version fallback for documents and items
//! - Heading nesting and slug uniqueness end to end
//! - Assembly determinism
//! - Asset-backed items (table, image) and dropped unknown types

use anyhow::Result;
use serde_json::{json, Map};
use std::sync::Arc;
use structure_core::{
    assembly::headings_to_tree, db::BlobOptions, AssetInfo, DatabaseService, Document,
    DocumentMatch, ItemContent, ItemRecord, RenderItem, RenderNode, StoreConfig,
    StructureService, StructureWriter,
};
use tempfile::TempDir;

/// Test helper: a writable store plus its config
async fn create_test_env() -> Result<(StructureWriter, StoreConfig, TempDir)> {
    let temp_dir = TempDir::new()?;
    let config = StoreConfig::with_root(temp_dir.path());
    let db = Arc::new(DatabaseService::create(config.db_path()).await?);
    let writer = StructureWriter::new(db, config.blobs_root());
    Ok((writer, config, temp_dir))
}

fn document(uid: &str, url: &str, version_id: i64, title: &str) -> Document {
    Document {
        uid: uid.to_string(),
        sid: format!("s-{}", uid),
        url: url.to_string(),
        version_id,
        title: title.to_string(),
        level: url.split('/').count() as i64,
        order: 0,
        path: Some(format!("{}.md", url)),
        tags: vec!["docs".to_string()],
        meta_data: Map::new(),
        format: "markdown".to_string(),
        toc: None,
    }
}

async fn add_items(
    writer: &StructureWriter,
    doc: &Document,
    contents: Vec<ItemContent>,
) -> Result<()> {
    for (index, content) in contents.into_iter().enumerate() {
        writer
            .insert_item(&ItemRecord::new(&doc.sid, doc.version_id, index as i64, content))
            .await?;
    }
    Ok(())
}

fn heading(level: u8, text: &str) -> ItemContent {
    ItemContent::Heading {
        level,
        text: text.to_string(),
    }
}

// =========================================================================
// Version Fallback
// =========================================================================

#[tokio::test]
async fn test_requested_version_falls_back_to_latest() -> Result<()> {
    let (writer, config, _temp_dir) = create_test_env().await?;

    let v1 = document("guide", "guide", 1, "Guide one");
    let v2 = document("guide", "guide", 2, "Guide two");
    writer.insert_document(&v1).await?;
    writer.insert_document(&v2).await?;
    add_items(&writer, &v1, vec![heading(1, "Old")]).await?;
    add_items(&writer, &v2, vec![heading(1, "New")]).await?;

    let service = StructureService::open(&config).await?;
    let key = DocumentMatch::Url("guide".to_string());

    let pinned = service.get_entry(&key, Some(1)).await?;
    assert_eq!(pinned.title, "Guide one");
    assert_eq!(pinned.headings[0].label, "Old");

    let missing_version = service.get_entry(&key, Some(5)).await?;
    assert_eq!(missing_version.title, "Guide two");
    assert_eq!(missing_version.headings[0].label, "New");

    let current = service.get_entry(&key, None).await?;
    assert_eq!(current.data["version_id"], json!(2));
    Ok(())
}

#[tokio::test]
async fn test_document_without_items_at_its_version_uses_latest_items() -> Result<()> {
    let (writer, config, _temp_dir) = create_test_env().await?;

    let v1 = document("page", "page", 1, "Page");
    writer.insert_document(&v1).await?;
    add_items(&writer, &v1, vec![ItemContent::Paragraph { text: "kept".into() }]).await?;
    writer.insert_document(&document("page", "page", 2, "Page v2")).await?;

    let service = StructureService::open(&config).await?;
    let entry = service
        .get_entry(&DocumentMatch::Uid("page".to_string()), None)
        .await?;

    assert_eq!(entry.title, "Page v2");
    assert_eq!(entry.items.len(), 1);
    Ok(())
}

// =========================================================================
// Headings
// =========================================================================

#[tokio::test]
async fn test_heading_sequence_nests_and_slugs_are_unique() -> Result<()> {
    let (writer, config, _temp_dir) = create_test_env().await?;

    let doc = document("manual", "manual", 1, "Manual");
    writer.insert_document(&doc).await?;
    add_items(
        &writer,
        &doc,
        vec![
            heading(1, "Intro"),
            heading(2, "Setup"),
            heading(2, "Setup"),
            heading(1, "Usage"),
            heading(3, "Setup"),
        ],
    )
    .await?;

    let service = StructureService::open(&config).await?;
    let entry = service
        .get_entry(&DocumentMatch::Sid("s-manual".to_string()), None)
        .await?;

    let slugs: Vec<&str> = entry.headings.iter().map(|h| h.slug.as_str()).collect();
    assert_eq!(slugs, vec!["intro", "setup", "setup-2", "usage", "setup-3"]);

    let tree = headings_to_tree(&entry.headings, false);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].items.as_ref().map(Vec::len), Some(2));
    assert_eq!(tree[1].items.as_ref().map(Vec::len), Some(1));
    assert_eq!(tree[1].items.as_ref().unwrap()[0].slug, "setup-3");
    Ok(())
}

#[tokio::test]
async fn test_entry_assembly_is_idempotent() -> Result<()> {
    let (writer, config, _temp_dir) = create_test_env().await?;

    let doc = document("same", "same", 1, "Same");
    writer.insert_document(&doc).await?;
    add_items(
        &writer,
        &doc,
        vec![
            heading(1, "A"),
            ItemContent::Paragraph { text: "body".into() },
            heading(2, "A"),
        ],
    )
    .await?;

    let service = StructureService::open(&config).await?;
    let key = DocumentMatch::Url("same".to_string());
    let first = serde_json::to_string(&service.get_entry(&key, None).await?)?;
    let second = serde_json::to_string(&service.get_entry(&key, None).await?)?;
    assert_eq!(first, second);
    Ok(())
}

// =========================================================================
// Asset-backed Items
// =========================================================================

#[tokio::test]
async fn test_asset_backed_items() -> Result<()> {
    let (writer, config, _temp_dir) = create_test_env().await?;

    let doc = document("guide.charts", "guide/charts", 1, "Charts");
    writer.insert_document(&doc).await?;

    let table = writer
        .put_blob(
            br#"[{"city": "Oslo", "pop": 700000}, {"city": "Bergen"}]"#,
            &BlobOptions::overflow("tables").with_compression(),
        )
        .await?;
    let image = writer.put_blob(b"GIF89a", &BlobOptions::inline()).await?;

    for (uid, blob_uid, ext) in [
        ("guide.charts#table", &table.blob_uid, "json"),
        ("guide.charts#logo", &image.blob_uid, "gif"),
    ] {
        let mut info = AssetInfo::new(uid, "asset", blob_uid.clone());
        info.parent_doc_uid = Some(doc.uid.clone());
        info.ext = Some(ext.to_string());
        writer.insert_asset_info(&info).await?;
        writer.link_asset_version(uid, 1, blob_uid).await?;
    }

    add_items(
        &writer,
        &doc,
        vec![
            ItemContent::Table { body: "![](asset:///guide.charts#table)".into() },
            ItemContent::Image { body: "![Logo](asset:///guide.charts#logo)".into() },
            ItemContent::Other { type_name: "generic".into(), body: "skipped".into() },
        ],
    )
    .await?;

    let service = StructureService::open(&config).await?;
    let entry = service
        .get_entry(&DocumentMatch::Url("guide/charts".to_string()), None)
        .await?;

    assert_eq!(entry.items.len(), 2);

    let Some(RenderNode::Table { children }) = entry.items[0].node() else {
        panic!("expected table, got {:?}", entry.items[0]);
    };
    assert_eq!(children[0].texts(), vec!["city", "pop"]);
    assert_eq!(children[2].texts(), vec!["Bergen", ""]);

    match &entry.items[1] {
        RenderItem::Node {
            node: RenderNode::Image { url, alt, .. },
            position,
        } => {
            assert_eq!(url, "data:image/gif;base64,R0lGODlh");
            assert_eq!(alt, "Logo");
            assert_eq!(position.start.line, 2);
        }
        other => panic!("expected image, got {:?}", other),
    }
    Ok(())
}
