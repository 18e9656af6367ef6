use serde::{Deserialize, Serialize};

/// One row of `blob_store`
///
/// Either `payload` holds the bytes inline, or `path` + `hash` locate them
/// under `<store-root>/blobs/<path>/<hash>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRecord {
    /// Storage key, independent of content
    pub blob_uid: String,

    /// Content digest used for deduplication
    pub hash: Option<String>,

    pub path: Option<String>,

    #[serde(skip)]
    pub payload: Option<Vec<u8>>,

    /// Payload (inline or on disk) is gzip-compressed
    pub compression: bool,

    /// Uncompressed size in bytes, when the collector recorded it
    pub size: Option<i64>,
}
