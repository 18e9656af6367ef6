//! Structure Core: read path of the versioned content structure store
//!
//! This crate reconstructs documents and navigation trees from the flat,
//! ordered records an upstream collector writes into an embedded relational
//! store, and resolves embedded asset references to the binary payloads held
//! in the content-addressable blob store.
//!
//! # Architecture
//!
//! - **libsql**: Embedded SQLite-compatible database, opened read-only once per process
//! - **Explicit clients**: every component owns its handle and caches, no process globals
//! - **Versioned rows**: documents, items and assets are partitioned by `version_id`
//! - **Content-addressed blobs**: deduplicated by hash, inline or on the filesystem, optionally gzip'd
//!
//! # Modules
//!
//! - [`config`] - Store and server configuration
//! - [`db`] - Database layer: connection, schema, producer-side writer
//! - [`models`] - Data structures (Document, Item, AssetInfo, BlobRecord, render tree)
//! - [`services`] - Blob store, version/document resolvers, asset repository, entry facade
//! - [`assembly`] - Item assembly, slugs, heading trees and asset links
//! - [`navigation`] - Top-level menu and section sidebar trees
//! - [`http`] - axum router serving entries, menus and asset bytes

pub mod assembly;
pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod navigation;
pub mod services;

// Re-export commonly used types
pub use config::StoreConfig;
pub use db::{DatabaseError, DatabaseService, StructureWriter};
pub use models::*;
pub use services::*;
