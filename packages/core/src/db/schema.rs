//! Store schema
//!
//! The tables the upstream collector populates. The read path never creates
//! them; [`initialize_schema`] exists for the producer side and test fixtures.

use crate::db::error::DatabaseError;

/// CREATE statements, idempotent
pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS documents (
        uid TEXT NOT NULL,
        sid TEXT NOT NULL,
        url TEXT NOT NULL,
        version_id INTEGER NOT NULL,
        title TEXT,
        level INTEGER NOT NULL DEFAULT 0,
        "order" INTEGER NOT NULL DEFAULT 0,
        path TEXT,
        tags TEXT,
        meta_data TEXT,
        format TEXT,
        toc TEXT,
        UNIQUE (url, version_id)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_documents_uid ON documents (uid, version_id)",
    "CREATE INDEX IF NOT EXISTS idx_documents_sid ON documents (sid, version_id)",
    r#"CREATE TABLE IF NOT EXISTS items (
        doc_sid TEXT NOT NULL,
        version_id INTEGER NOT NULL,
        type TEXT NOT NULL,
        level INTEGER,
        order_index INTEGER NOT NULL,
        body_text TEXT,
        ast TEXT,
        UNIQUE (doc_sid, version_id, order_index)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS asset_info (
        uid TEXT NOT NULL,
        type TEXT NOT NULL,
        blob_uid TEXT NOT NULL,
        parent_doc_uid TEXT,
        path TEXT,
        ext TEXT,
        params TEXT,
        title TEXT,
        UNIQUE (uid, blob_uid)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS assets (
        asset_uid TEXT NOT NULL,
        version_id INTEGER NOT NULL,
        blob_uid TEXT NOT NULL,
        UNIQUE (asset_uid, version_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS blob_store (
        blob_uid TEXT PRIMARY KEY,
        hash TEXT NOT NULL UNIQUE,
        path TEXT,
        payload BLOB,
        compression INTEGER NOT NULL DEFAULT 0,
        size INTEGER NOT NULL DEFAULT 0
    )"#,
    r#"CREATE TABLE IF NOT EXISTS versions (
        version_id INTEGER PRIMARY KEY,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    )"#,
];

/// Create every table and index if missing
pub async fn initialize_schema(conn: &libsql::Connection) -> Result<(), DatabaseError> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, ()).await.map_err(|e| {
            DatabaseError::initialization_failed(format!("{}: {}", first_line(statement), e))
        })?;
    }
    Ok(())
}

fn first_line(statement: &str) -> &str {
    statement.lines().next().unwrap_or(statement).trim()
}
