//! Heading anchors
//!
//! Slugs are URL-fragment-safe and unique within one document. The same
//! heading sequence always yields the same slugs.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Slug used when a heading has no usable characters
pub const FALLBACK_SLUG: &str = "section";

static DISALLOWED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DASHES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Normalize heading text into an anchor
///
/// Trims, lowercases, drops everything outside `[a-z0-9\s-]`, turns
/// whitespace runs into `-` and collapses repeated dashes.
pub fn slugify(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let kept = DISALLOWED_RE.replace_all(&lower, "");
    let dashed = WHITESPACE_RE.replace_all(&kept, "-");
    let slug = DASHES_RE.replace_all(&dashed, "-");

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.into_owned()
    }
}

/// Hands out document-unique slugs
///
/// The n-th repeat of a base slug becomes `<base>-<n>`; a suffixed candidate
/// that collides with a slug already handed out is skipped.
#[derive(Debug, Default)]
pub struct SlugTracker {
    seen: HashMap<String, usize>,
    used: HashSet<String>,
}

impl SlugTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugify `text` and make the result unique
    pub fn unique(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.seen.entry(base.clone()).or_insert(0);

        let mut candidate = base.clone();
        if *count > 0 || self.used.contains(&candidate) {
            let mut n = (*count).max(1) + 1;
            loop {
                candidate = format!("{}-{}", base, n);
                if !self.used.contains(&candidate) {
                    break;
                }
                n += 1;
            }
        }

        *count += 1;
        self.used.insert(candidate.clone());
        candidate
    }
}

/// Short stable id: first 8 hex chars of the SHA-256 of `value`
pub fn short_id(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    digest
        .iter()
        .take(4)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}
