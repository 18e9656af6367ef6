//! Extension to MIME type tables

use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

fn normalized_ext(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// MIME type for inline image data URLs
pub fn image_mime(ext: Option<&str>) -> &'static str {
    let Some(ext) = ext else {
        return OCTET_STREAM;
    };
    match normalized_ext(ext).as_str() {
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => OCTET_STREAM,
    }
}

/// MIME type for a served asset
///
/// Accepts a bare extension (`png`, `.png`) or a path/uid whose extension is
/// used. Covers the image table plus common text formats.
pub fn file_mime(name_or_ext: &str) -> &'static str {
    let ext = match Path::new(name_or_ext).extension() {
        Some(ext) => ext.to_string_lossy().into_owned(),
        None => name_or_ext.to_string(),
    };

    match normalized_ext(&ext).as_str() {
        "txt" | "md" | "json" | "yaml" | "yml" | "csv" | "tsv" => "text/plain",
        other => image_mime(Some(other)),
    }
}
