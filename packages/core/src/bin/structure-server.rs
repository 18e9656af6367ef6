//! Structure Server Binary
//!
//! Serves assembled entries, menus and asset bytes from a structure store
//! produced by the upstream collector.
//!
//! # Usage
//!
//! ```bash
//! # Serve ./.structure on 127.0.0.1:3001
//! cargo run --bin structure-server
//!
//! # Another store, pinned to one version
//! STRUCTURE=/srv/site/.structure STRUCTURE_VERSION=42 cargo run --bin structure-server
//! ```
//!
//! # Environment Variables
//!
//! - `STRUCTURE`: Store root directory (default: `./.structure`)
//! - `STRUCTURE_VERSION`: Serve this version instead of the latest
//! - `STRUCTURE_HOST` / `STRUCTURE_PORT`: Bind address (default: `127.0.0.1:3001`)
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::sync::Arc;

use anyhow::Context;
use structure_core::{StoreConfig, StructureService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = StoreConfig::from_env();
    tracing::info!(
        store = %config.store_root.display(),
        version_override = ?config.version_override,
        "starting structure server"
    );

    let service = StructureService::open(&config)
        .await
        .with_context(|| format!("cannot open structure store at {}", config.db_path().display()))?;

    structure_core::http::serve(Arc::new(service), &config.bind_addr()).await
}
