//! Navigation Tree Builder
//!
//! Builds the top-level menu and the per-section sidebar tree straight from
//! document urls. Nothing is persisted; menus are derived per request.

mod menu;
mod section;

pub use menu::{build_menus_from, section_tree, top_level_menu};
pub use section::{
    in_section, last_segment, normalize_url, parent_url, section_from_pathname, HOME_SECTION,
};

use crate::db::DatabaseService;
use crate::models::{Menus, NavDocument, VersionId};
use crate::services::error::StoreError;
use crate::services::row;
use std::sync::Arc;

pub struct NavigationBuilder {
    db: Arc<DatabaseService>,
}

impl NavigationBuilder {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Navigation rows ordered by `(level, order, url)`
    ///
    /// With a version, the documents published in that version; when it has
    /// none (or no version is given), the latest row of every url.
    pub async fn load(&self, version: Option<VersionId>) -> Result<Vec<NavDocument>, StoreError> {
        if let Some(version) = version {
            let documents = self
                .db
                .fetch_all(
                    "navigation",
                    r#"SELECT url, title, level, "order" FROM documents
                       WHERE version_id = ?
                       ORDER BY level, "order", url"#,
                    [version],
                    row_to_nav,
                )
                .await?;
            if !documents.is_empty() {
                return Ok(documents);
            }
            tracing::debug!(version, "no documents at version, using latest per url");
        }

        self.db
            .fetch_all(
                "navigation",
                r#"SELECT d.url, d.title, d.level, d."order" FROM documents d
                   WHERE d.version_id = (SELECT MAX(version_id) FROM documents WHERE url = d.url)
                   ORDER BY d.level, d."order", d.url"#,
                (),
                row_to_nav,
            )
            .await
    }

    /// Menus for a request path
    pub async fn build_menus(
        &self,
        pathname: &str,
        version: Option<VersionId>,
    ) -> Result<Menus, StoreError> {
        let documents = self.load(version).await?;
        Ok(build_menus_from(&documents, pathname))
    }
}

fn row_to_nav(row: &libsql::Row) -> Result<NavDocument, StoreError> {
    Ok(NavDocument {
        url: row::text(row, 0, "url")?,
        title: row::opt_text(row, 1, "title")?.unwrap_or_default(),
        level: row::opt_int(row, 2, "level")?.unwrap_or(0),
        order: row::opt_int(row, 3, "order")?.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{document, Fixture};

    #[tokio::test]
    async fn test_build_menus_from_store() {
        let fx = Fixture::new().await;
        for url in ["a", "a/b", "a/b/c"] {
            fx.add(&document(url, 1)).await;
        }
        fx.add(&document("old", 0)).await;

        let builder = NavigationBuilder::new(fx.reader().await);

        let menus = builder.build_menus("/a/b/c", Some(1)).await.unwrap();
        assert!(menus.find("a/b/c").unwrap().active);
        assert_eq!(menus.find("a").unwrap().expanded, Some(true));
        let top: Vec<&str> = menus.top_level_menu.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(top, vec!["a"]);

        let latest = builder.load(None).await.unwrap();
        let urls: Vec<&str> = latest.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "old", "a/b", "a/b/c"]);
    }
}
