//! Item Data Structures
//!
//! An item is one ordered content unit inside a document. The store keeps a
//! free-form `type` column; here it becomes a tagged variant so the assembler
//! can dispatch with an exhaustive `match`.

use serde::{Deserialize, Serialize};

use super::VersionId;

/// Per-type payload of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemContent {
    /// Section heading; nesting is inferred from the sequence of levels
    Heading { level: u8, text: String },
    Paragraph { text: String },
    /// Body holds an embedded asset reference
    Image { body: String },
    Code { body: String },
    Link { body: String },
    Table { body: String },
    /// `generic` or any type this reader does not reconstruct
    Other { type_name: String, body: String },
}

impl ItemContent {
    /// Build the variant from the raw store columns
    ///
    /// Heading levels default to 1. Stored levels are kept as-is (floored at 1)
    /// because nesting is derived from them.
    pub fn from_columns(type_name: &str, level: Option<i64>, body_text: Option<String>) -> Self {
        let body = body_text.unwrap_or_default();
        match type_name {
            "heading" => ItemContent::Heading {
                level: level.unwrap_or(1).clamp(1, i64::from(u8::MAX)) as u8,
                text: body,
            },
            "paragraph" => ItemContent::Paragraph { text: body },
            "image" => ItemContent::Image { body },
            "code" => ItemContent::Code { body },
            "link" => ItemContent::Link { body },
            "table" => ItemContent::Table { body },
            other => ItemContent::Other {
                type_name: other.to_string(),
                body,
            },
        }
    }

    /// The store's `type` string for this variant
    pub fn type_name(&self) -> &str {
        match self {
            ItemContent::Heading { .. } => "heading",
            ItemContent::Paragraph { .. } => "paragraph",
            ItemContent::Image { .. } => "image",
            ItemContent::Code { .. } => "code",
            ItemContent::Link { .. } => "link",
            ItemContent::Table { .. } => "table",
            ItemContent::Other { type_name, .. } => type_name,
        }
    }
}

/// One row of the `items` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub doc_sid: String,
    pub version_id: VersionId,

    /// Strictly increasing within `(doc_sid, version_id)`
    pub order_index: i64,

    pub content: ItemContent,

    /// Raw JSON of a precomputed node; bypasses type-specific reconstruction
    pub ast: Option<String>,
}

impl ItemRecord {
    pub fn new(doc_sid: impl Into<String>, version_id: VersionId, order_index: i64, content: ItemContent) -> Self {
        Self {
            doc_sid: doc_sid.into(),
            version_id,
            order_index,
            content,
            ast: None,
        }
    }

    /// Attach a precomputed node
    pub fn with_ast(mut self, ast: impl Into<String>) -> Self {
        self.ast = Some(ast.into());
        self
    }
}
