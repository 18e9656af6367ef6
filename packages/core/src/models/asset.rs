//! Asset pointer
//!
//! `AssetInfo` names a blob from inside a document. Several asset rows may
//! share one `blob_uid` (different names, same content).

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Unique within a version scope; may encode a document-relative fragment
    pub uid: String,

    /// codeblock, image, linked_file, code_diagram, ...
    #[serde(rename = "type")]
    pub asset_type: String,

    pub blob_uid: String,
    pub parent_doc_uid: Option<String>,

    /// Relative on-disk path when the asset is also materialized as a static file
    pub path: Option<String>,

    pub ext: Option<String>,
    pub params: Option<String>,
    pub title: Option<String>,
}

impl AssetInfo {
    pub fn new(uid: impl Into<String>, asset_type: impl Into<String>, blob_uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            asset_type: asset_type.into(),
            blob_uid: blob_uid.into(),
            parent_doc_uid: None,
            path: None,
            ext: None,
            params: None,
            title: None,
        }
    }

    /// Declared extension without the leading dot, falling back to the path's
    pub fn effective_ext(&self) -> Option<String> {
        let declared = self
            .ext
            .as_deref()
            .map(|e| e.trim().trim_start_matches('.'))
            .filter(|e| !e.is_empty());

        match declared {
            Some(ext) => Some(ext.to_string()),
            None => self
                .path
                .as_deref()
                .and_then(|p| Path::new(p).extension())
                .map(|e| e.to_string_lossy().into_owned()),
        }
    }

    /// Last path segment, used for `Content-Disposition`
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(|p| p.rsplit(['/', '\\']).next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}
