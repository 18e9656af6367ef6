//! Database Layer
//!
//! This module handles all interactions with the embedded structure store:
//!
//! - Read-only connection management ([`DatabaseService`])
//! - The table layout the upstream collector produces ([`schema`])
//! - A producer-side writer honoring the collector contract ([`StructureWriter`])
//!
//! # Architecture
//!
//! The store is a libsql (SQLite-compatible) file at
//! `<store-root>/structure.db`. Large blobs may overflow to
//! `<store-root>/blobs/<path>/<hash>`. The serving process opens the file
//! read-only once and shares the handle by `Arc`.

mod database;
mod error;
pub mod schema;
mod writer;

pub use database::DatabaseService;
pub use error::DatabaseError;
pub use writer::{content_hash, BlobOptions, StoredBlob, StructureWriter};
