//! Document Data Structures
//!
//! A `Document` is one versioned content page. The collector replaces rows
//! wholesale per version; the read path never mutates them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Heading;

/// Monotonic marker partitioning snapshots produced by successive collector runs
pub type VersionId = i64;

/// How a caller addresses a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentMatch {
    /// Globally unique identifier
    Uid(String),
    /// Short identifier derived from the uid
    Sid(String),
    /// Route path
    Url(String),
}

impl DocumentMatch {
    /// Column holding this key in the `documents` table
    pub fn column(&self) -> &'static str {
        match self {
            DocumentMatch::Uid(_) => "uid",
            DocumentMatch::Sid(_) => "sid",
            DocumentMatch::Url(_) => "url",
        }
    }

    /// The key value being matched
    pub fn value(&self) -> &str {
        match self {
            DocumentMatch::Uid(v) | DocumentMatch::Sid(v) | DocumentMatch::Url(v) => v,
        }
    }
}

/// One logical content page at one version
///
/// JSON-encoded columns (`tags`, `meta_data`, `toc`) are already decoded;
/// malformed values decode to empty defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub uid: String,
    pub sid: String,
    pub url: String,
    pub version_id: VersionId,
    pub title: String,

    /// Depth in the URL hierarchy
    pub level: i64,

    /// Sibling ordering
    pub order: i64,

    /// Source path of the document, used to relativize asset paths
    pub path: Option<String>,

    pub tags: Vec<String>,
    pub meta_data: Map<String, Value>,

    /// Source format, "markdown" when the store leaves it unset
    pub format: String,

    /// Precomputed heading list, when the collector stored one
    pub toc: Option<Vec<Heading>>,
}

impl Document {
    /// Merge the decoded `meta_data` with the document's own fields
    ///
    /// Document fields win on key collision.
    pub fn to_data(&self) -> Map<String, Value> {
        let mut data = self.meta_data.clone();
        if let Ok(Value::Object(fields)) = serde_json::to_value(self) {
            for (key, value) in fields {
                data.insert(key, value);
            }
        }
        data
    }
}

/// `(sid, url)` pair used for the short-link redirect map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSummary {
    pub sid: String,
    pub url: String,
}

/// The columns navigation needs, one row per URL (latest version)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavDocument {
    pub url: String,
    pub title: String,
    pub level: i64,
    pub order: i64,
}

impl NavDocument {
    pub fn new(url: impl Into<String>, title: impl Into<String>, level: i64, order: i64) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            level,
            order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        let mut meta = Map::new();
        meta.insert("title".into(), json!("from meta"));
        meta.insert("author".into(), json!("kim"));

        Document {
            uid: "guide/intro".into(),
            sid: "a1b2c3d4".into(),
            url: "guide/intro".into(),
            version_id: 3,
            title: "Introduction".into(),
            level: 2,
            order: 1,
            path: Some("guide/intro.md".into()),
            tags: vec!["start".into()],
            meta_data: meta,
            format: "markdown".into(),
            toc: None,
        }
    }

    #[test]
    fn test_data_document_fields_win() {
        let data = sample().to_data();
        assert_eq!(data["title"], json!("Introduction"));
        assert_eq!(data["author"], json!("kim"));
        assert_eq!(data["version_id"], json!(3));
        assert_eq!(data["tags"], json!(["start"]));
    }

    #[test]
    fn test_match_columns() {
        assert_eq!(DocumentMatch::Uid("x".into()).column(), "uid");
        assert_eq!(DocumentMatch::Sid("x".into()).column(), "sid");
        assert_eq!(DocumentMatch::Url("a/b".into()).value(), "a/b");
    }
}
