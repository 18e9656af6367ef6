//! Asset references embedded in item bodies
//!
//! Item bodies point at assets with markdown image syntax and the
//! `asset:///` scheme: `![alt](asset:///<asset uid>)`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use super::mime::image_mime;

static ASSET_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(asset:///([^)]+)\)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLink {
    /// Alt text, possibly empty
    pub alt: String,
    pub uid: String,
}

/// First `![alt](asset:///uid)` reference in `body`
pub fn parse_asset_link(body: &str) -> Option<AssetLink> {
    let caps = ASSET_LINK_RE.captures(body)?;
    Some(AssetLink {
        alt: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
        uid: caps.get(2)?.as_str().to_string(),
    })
}

/// Make an asset path relative to the document that embeds it
///
/// The document's directory prefix is stripped. Paths escaping two levels up
/// (`../../`) and documents at the root are left alone.
pub fn normalize_asset_path(asset_path: &str, document_path: Option<&str>) -> String {
    let Some(document_path) = document_path.filter(|p| !p.is_empty()) else {
        return asset_path.to_string();
    };

    let doc_dir = Path::new(document_path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    if doc_dir.is_empty() || doc_dir == "." || asset_path.starts_with("../../") {
        return asset_path.to_string();
    }

    let prefix = if doc_dir.ends_with('/') {
        doc_dir
    } else {
        format!("{}/", doc_dir)
    };

    asset_path
        .strip_prefix(prefix.as_str())
        .unwrap_or(asset_path)
        .to_string()
}

/// `data:<mime>;base64,<payload>` URL for inline embedding
pub fn data_url(bytes: &[u8], ext: Option<&str>) -> String {
    format!("data:{};base64,{}", image_mime(ext), STANDARD.encode(bytes))
}
