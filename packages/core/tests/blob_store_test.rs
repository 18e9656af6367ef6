//! Integration tests for the content-addressed blob store
//!
//! Tests cover:
//! - Deduplication of identical payloads
//! - Inline, overflow and compressed payloads decoding to the same bytes
//! - Corrupt payloads reported distinctly from absent ones

use anyhow::Result;
use std::sync::Arc;
use structure_core::{
    db::{content_hash, BlobOptions},
    BlobStore, DatabaseError, DatabaseService, StoreConfig, StructureWriter,
};
use tempfile::TempDir;

async fn create_test_env() -> Result<(StructureWriter, Arc<DatabaseService>, StoreConfig, TempDir)> {
    let temp_dir = TempDir::new()?;
    let config = StoreConfig::with_root(temp_dir.path());
    let db = Arc::new(DatabaseService::create(config.db_path()).await?);
    let writer = StructureWriter::new(db.clone(), config.blobs_root());
    Ok((writer, db, config, temp_dir))
}

async fn reader(config: &StoreConfig) -> Result<BlobStore> {
    let db = Arc::new(DatabaseService::open_read_only(config.db_path()).await?);
    Ok(BlobStore::new(db, config.blobs_root()))
}

#[tokio::test]
async fn test_identical_content_is_stored_once() -> Result<()> {
    let (writer, db, _config, _temp_dir) = create_test_env().await?;
    let payload = b"shared diagram source";

    let first = writer.put_blob(payload, &BlobOptions::inline()).await?;
    let second = writer.put_blob(payload, &BlobOptions::overflow("elsewhere")).await?;

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.blob_uid, second.blob_uid);
    assert_eq!(first.hash, content_hash(payload));

    let blob_uids: Vec<String> = db
        .fetch_all(
            "count",
            "SELECT blob_uid FROM blob_store WHERE hash = ?",
            [first.hash.as_str()],
            |row| row.get::<String>(0).map_err(DatabaseError::LibsqlError),
        )
        .await?;
    assert_eq!(blob_uids, vec![first.blob_uid.clone()]);
    Ok(())
}

#[tokio::test]
async fn test_every_storage_layout_decodes_to_plaintext() -> Result<()> {
    let (writer, _db, config, _temp_dir) = create_test_env().await?;

    let layouts = [
        (b"inline plain".to_vec(), BlobOptions::inline()),
        (b"inline gzip".to_vec(), BlobOptions::compressed()),
        (b"file plain".to_vec(), BlobOptions::overflow("files")),
        (b"file gzip".to_vec(), BlobOptions::overflow("files").with_compression()),
    ];

    let mut stored = Vec::new();
    for (bytes, options) in &layouts {
        stored.push((writer.put_blob(bytes, options).await?, bytes.clone()));
    }

    let blobs = reader(&config).await?;
    for (blob, expected) in stored {
        let loaded = blobs.load(&blob.blob_uid).await?;
        assert_eq!(loaded.as_deref(), Some(expected.as_slice()));

        let record = blobs.record(&blob.blob_uid).await?.unwrap();
        assert_eq!(record.size, Some(expected.len() as i64));
    }
    Ok(())
}

#[tokio::test]
async fn test_corrupt_and_absent_are_distinct() -> Result<()> {
    let (writer, db, config, _temp_dir) = create_test_env().await?;
    let good = writer.put_blob(b"fine", &BlobOptions::compressed()).await?;

    let conn = db.connect_with_timeout().await?;
    conn.execute(
        "INSERT INTO blob_store (blob_uid, hash, payload, compression, size) VALUES ('99', 'x', 'plain text', 1, 10)",
        (),
    )
    .await?;

    let blobs = reader(&config).await?;
    assert_eq!(blobs.load(&good.blob_uid).await?.as_deref(), Some(&b"fine"[..]));
    assert!(blobs.load("12345").await?.is_none());

    let err = blobs.load("99").await.unwrap_err();
    assert!(err.is_corrupt());
    Ok(())
}
