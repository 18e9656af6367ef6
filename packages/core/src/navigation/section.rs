//! Route path helpers

/// Section of requests at the site root; matches every document
pub const HOME_SECTION: &str = "home";

/// Strip surrounding whitespace and slashes, collapse empty segments
pub fn normalize_url(url: &str) -> String {
    url.trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Non-empty `/`-delimited segments of a url
pub fn segments(url: &str) -> Vec<&str> {
    url.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// First segment of the path, or [`HOME_SECTION`] for the root
pub fn section_from_pathname(pathname: &str) -> String {
    segments(pathname)
        .first()
        .map(|segment| segment.to_string())
        .unwrap_or_else(|| HOME_SECTION.to_string())
}

/// Url with its last segment dropped; `None` for top-level urls
pub fn parent_url(url: &str) -> Option<String> {
    let normalized = normalize_url(url);
    let (parent, _) = normalized.rsplit_once('/')?;
    Some(parent.to_string())
}

/// Last segment of a url
pub fn last_segment(url: &str) -> &str {
    segments(url).last().copied().unwrap_or("")
}

/// Whether a document at `url` belongs to `section`
pub fn in_section(url: &str, section: &str) -> bool {
    if section == HOME_SECTION {
        return true;
    }
    let url = url.trim_matches('/');
    url == section || url.starts_with(&format!("{}/", section))
}
