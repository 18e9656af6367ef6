//! Heading Data Structures
//!
//! `Heading` is the flat record extracted while assembling a document (or
//! decoded from the document's stored `toc`). `TocNode` is its nested form,
//! built by [`crate::assembly::headings_to_tree`].

use serde::{Deserialize, Serialize};

/// One heading of a document
///
/// Collector-produced tables of contents may carry `body_text`/`level`
/// instead of `label`/`depth`; both spellings decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heading {
    #[serde(alias = "body_text")]
    pub label: String,

    /// Anchor, unique within the document
    pub slug: String,

    /// `<docUid>#<slug>`
    pub uid: String,

    /// Short id derived from `uid`
    pub sid: String,

    #[serde(alias = "level")]
    pub depth: u8,

    /// 1-based position of the source item in the document
    pub line: usize,
}

impl Default for Heading {
    fn default() -> Self {
        Self {
            label: String::new(),
            slug: String::new(),
            uid: String::new(),
            sid: String::new(),
            depth: 1,
            line: 0,
        }
    }
}

/// Nested heading, as rendered in the in-page table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocNode {
    pub label: String,
    pub slug: String,
    pub depth: u8,

    /// `#<slug>` in TOC mode, empty otherwise
    pub link: String,

    pub uid: String,

    /// Sort key among siblings
    pub order: usize,

    /// True when the node has children
    pub parent: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<TocNode>>,
}

/// Table of contents handed to the page layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TocMenu {
    pub items: Vec<TocNode>,

    /// False when the document has no headings
    pub visible: bool,
}
