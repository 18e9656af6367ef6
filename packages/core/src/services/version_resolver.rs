//! Version Resolver
//!
//! Determines the process-wide "current" version. The value is computed once
//! at construction and then treated as immutable configuration; `refresh()`
//! is the explicit, externally triggered way to observe a newly published
//! version without restarting.
//!
//! A `None` version is a valid outcome (empty store, unreadable store): callers
//! treat it as "no version filter, use the latest row per key".

use crate::db::{DatabaseError, DatabaseService};
use crate::models::VersionId;
use crate::services::row;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct VersionResolver {
    db: Arc<DatabaseService>,

    /// Configured pin; skips the store query entirely
    pinned: Option<VersionId>,

    current: RwLock<Option<VersionId>>,
}

impl VersionResolver {
    /// Create the resolver and compute the current version
    pub async fn new(db: Arc<DatabaseService>, pinned: Option<VersionId>) -> Self {
        let resolver = Self {
            db,
            pinned,
            current: RwLock::new(None),
        };
        resolver.refresh().await;
        resolver
    }

    /// The version computed at construction or by the last `refresh()`
    pub async fn current(&self) -> Option<VersionId> {
        *self.current.read().await
    }

    /// Recompute the current version and swap it in
    pub async fn refresh(&self) -> Option<VersionId> {
        let version = match self.pinned {
            Some(pinned) => Some(pinned),
            None => self.latest_version().await,
        };

        let mut current = self.current.write().await;
        if *current != version {
            tracing::info!(previous = ?*current, current = ?version, "structure version resolved");
        }
        *current = version;
        version
    }

    /// Highest version known to the store, or `None` on any failure
    ///
    /// Prefers the dedicated `versions` table when it exists and has rows,
    /// otherwise scans `documents`.
    pub async fn latest_version(&self) -> Option<VersionId> {
        match self.query_latest().await {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!(error = %e, "version lookup failed, serving without version constraint");
                None
            }
        }
    }

    async fn query_latest(&self) -> Result<Option<VersionId>, DatabaseError> {
        if self.db.table_exists("versions").await? {
            if let Some(version) = self.max_of("SELECT MAX(version_id) FROM versions").await? {
                return Ok(Some(version));
            }
        }
        self.max_of("SELECT MAX(version_id) FROM documents").await
    }

    async fn max_of(&self, sql: &str) -> Result<Option<VersionId>, DatabaseError> {
        let max = self
            .db
            .fetch_one("latest_version", sql, (), |row| {
                row::opt_int(row, 0, "version_id")
                    .map_err(|e| DatabaseError::sql_execution(e.to_string()))
            })
            .await?;
        Ok(max.flatten())
    }
}
