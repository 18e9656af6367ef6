//! HTTP error handling
//!
//! Every failed request answers with the same JSON shape:
//! `{"message": ..., "code": ..., "details": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::services::{BlobError, StoreError};

pub const DOCUMENT_NOT_FOUND: &str = "DOCUMENT_NOT_FOUND";
pub const ASSET_NOT_FOUND: &str = "ASSET_NOT_FOUND";
pub const INVALID_INPUT: &str = "INVALID_INPUT";
pub const ASSET_CORRUPT: &str = "ASSET_CORRUPT";
pub const STORE_ERROR: &str = "STORE_ERROR";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            DOCUMENT_NOT_FOUND | ASSET_NOT_FOUND => StatusCode::NOT_FOUND,
            INVALID_INPUT => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "request failed");
        }
        (status, Json(self)).into_response()
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Blob(BlobError::Corrupt { blob_uid, reason }) => HttpError::with_details(
                format!("Asset payload {} cannot be decoded", blob_uid),
                ASSET_CORRUPT,
                reason,
            ),
            other => HttpError::with_details("Structure store query failed", STORE_ERROR, other.to_string()),
        }
    }
}
