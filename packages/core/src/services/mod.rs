//! Read-path Services
//!
//! - `BlobStore` - content-addressed payload loading with a per-client cache
//! - `VersionResolver` - the process-wide current version
//! - `DocumentResolver` - documents, items and assets with version fallback
//! - `AssetRepository` - asset addresses to metadata plus bytes
//! - `StructureService` - the facade tying them together
//!
//! Every component is an explicitly constructed value holding an
//! `Arc<DatabaseService>`; none of them keeps process-global state.

pub mod asset_repository;
pub mod blob_store;
pub mod document_resolver;
pub mod error;
pub(crate) mod row;
pub mod structure_service;
pub mod version_resolver;

#[cfg(test)]
pub(crate) mod test_support;

pub use asset_repository::{AssetAddress, AssetRepository, ResolvedAsset};
pub use blob_store::BlobStore;
pub use document_resolver::{DocumentResolver, DEFAULT_FORMAT};
pub use error::{BlobError, StoreError};
pub use structure_service::StructureService;
pub use version_resolver::VersionResolver;
