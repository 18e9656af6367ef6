//! Asset endpoint
//!
//! # Endpoints
//!
//! - `GET /assets/*address` - decoded asset bytes
//!
//! `address` is `<assetUid>` (follows the current version, revalidated on
//! every use) or `<blobUid>:<assetUid>` (pinned, cached forever). The ETag is
//! the blob uid, so a matching `If-None-Match` answers 304 without a body.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::http_error::{HttpError, ASSET_NOT_FOUND, INVALID_INPUT};
use super::AppState;
use crate::assembly::file_mime;
use crate::services::{AssetAddress, ResolvedAsset};

pub const CACHE_CURRENT: &str = "private, max-age=0, no-cache";
pub const CACHE_PINNED: &str = "public, max-age=31536000, immutable";
const VARY: &str = "Authorization, Cookie";

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/assets/*address", get(get_asset))
        .with_state(state)
}

async fn get_asset(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let address = AssetAddress::parse(&raw);
    if address.asset_uid().is_empty() {
        return Err(HttpError::new("Missing asset uid", INVALID_INPUT));
    }

    let Some(asset) = state.service.asset(&address).await? else {
        tracing::debug!(address = %raw, "asset not found");
        return Err(HttpError::new(
            format!("Asset not found: {}", raw),
            ASSET_NOT_FOUND,
        ));
    };

    let etag = asset.info.blob_uid.clone();
    let cache_control = if asset.pinned {
        CACHE_PINNED
    } else {
        CACHE_CURRENT
    };

    let mut out = HeaderMap::new();
    out.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));
    out.insert(header::VARY, HeaderValue::from_static(VARY));
    if let Ok(value) = HeaderValue::from_str(&etag) {
        out.insert(header::ETAG, value);
    }

    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok());
    if if_none_match.is_some_and(|value| etag_matches(value, &etag)) {
        return Ok((StatusCode::NOT_MODIFIED, out).into_response());
    }

    add_content_headers(&mut out, &asset, address.asset_uid());
    Ok((StatusCode::OK, out, Body::from(asset.bytes)).into_response())
}

fn add_content_headers(out: &mut HeaderMap, asset: &ResolvedAsset, asset_uid: &str) {
    let mime_source = asset
        .info
        .ext
        .clone()
        .filter(|ext| !ext.trim().is_empty())
        .or_else(|| asset.info.path.clone())
        .unwrap_or_else(|| asset_uid.to_string());

    out.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(file_mime(&mime_source)),
    );
    out.insert(header::CONTENT_LENGTH, HeaderValue::from(asset.bytes.len()));

    if let Some(name) = asset.info.file_name() {
        let disposition = format!("inline; filename=\"{}\"", name.replace('"', ""));
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            out.insert(header::CONTENT_DISPOSITION, value);
        }
    }
}

/// `If-None-Match` against a bare blob-uid ETag
///
/// Accepts the bare value, its quoted or weak form, a list, or `*`.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').map(str::trim).any(|candidate| {
        let candidate = candidate.strip_prefix("W/").unwrap_or(candidate);
        candidate == "*" || candidate == etag || candidate.trim_matches('"') == etag
    })
}
