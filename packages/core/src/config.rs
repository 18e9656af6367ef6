//! Store configuration
//!
//! `StoreConfig` is the single source of truth for where the structure store
//! lives on disk and how the serving process binds. It is built once at
//! startup (usually via [`StoreConfig::from_env`]) and is immutable for the
//! process lifetime.
//!
//! # Environment Variables
//!
//! - `STRUCTURE`: Store root directory (default: `./.structure`)
//! - `STRUCTURE_VERSION`: Pin every query to this version id
//! - `STRUCTURE_HOST`: Bind host for the server (default: `127.0.0.1`)
//! - `STRUCTURE_PORT`: Bind port for the server (default: `3001`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::VersionId;

/// Default database file name inside the store root
pub const DEFAULT_DB_FILE: &str = "structure.db";

/// Directory (inside the store root) holding overflow blobs
pub const BLOBS_DIR: &str = "blobs";

const DEFAULT_PORT: u16 = 3001;

/// Configuration for the structure store and its server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Root directory written by the upstream collector
    pub store_root: PathBuf,

    /// Database file name, relative to `store_root`
    pub db_file: String,

    /// When set, the version resolver skips the store query and uses this id
    pub version_override: Option<VersionId>,

    /// Bind host for the HTTP server
    pub host: String,

    /// Bind port for the HTTP server
    pub port: u16,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from(".structure"),
            db_file: DEFAULT_DB_FILE.to_string(),
            version_override: None,
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl StoreConfig {
    /// Config rooted at `store_root`, all other settings default
    pub fn with_root(store_root: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
            ..Self::default()
        }
    }

    /// Build the configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// Unparseable numeric values are ignored (with a warning) and the
    /// default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup("STRUCTURE").filter(|v| !v.trim().is_empty()) {
            config.store_root = PathBuf::from(root);
        }

        if let Some(raw) = lookup("STRUCTURE_VERSION") {
            match raw.trim().parse::<VersionId>() {
                Ok(version) => config.version_override = Some(version),
                Err(_) => tracing::warn!(value = %raw, "ignoring unparseable STRUCTURE_VERSION"),
            }
        }

        if let Some(host) = lookup("STRUCTURE_HOST").filter(|v| !v.trim().is_empty()) {
            config.host = host;
        }

        if let Some(raw) = lookup("STRUCTURE_PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(value = %raw, "ignoring unparseable STRUCTURE_PORT"),
            }
        }

        config
    }

    /// Absolute or relative path to the database file
    pub fn db_path(&self) -> PathBuf {
        self.store_root.join(&self.db_file)
    }

    /// Root of the overflow blob tree: `<store-root>/blobs`
    pub fn blobs_root(&self) -> PathBuf {
        self.store_root.join(BLOBS_DIR)
    }

    /// `host:port` string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_lookup(|_| None);
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.db_path(), PathBuf::from(".structure/structure.db"));
        assert_eq!(config.blobs_root(), PathBuf::from(".structure/blobs"));
        assert_eq!(config.bind_addr(), "127.0.0.1:3001");
    }

    #[test]
    fn test_env_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("STRUCTURE", "/srv/site/.structure"),
            ("STRUCTURE_VERSION", "42"),
            ("STRUCTURE_HOST", "0.0.0.0"),
            ("STRUCTURE_PORT", "8080"),
        ]));

        assert_eq!(config.store_root, PathBuf::from("/srv/site/.structure"));
        assert_eq!(config.version_override, Some(42));
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_bad_numbers_keep_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("STRUCTURE_VERSION", "latest"),
            ("STRUCTURE_PORT", "http"),
        ]));

        assert_eq!(config.version_override, None);
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
