//! Render tree nodes
//!
//! The assembled output mirrors the markdown AST shapes the templating layer
//! already consumes (`{"type": "paragraph", "children": [...]}`), so each node
//! serializes with a `type` tag and a `position.start.line`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Plain text leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "text")]
pub struct TextNode {
    pub value: String,
}

impl TextNode {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "tableCell")]
pub struct TableCell {
    pub children: Vec<TextNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "tableRow")]
pub struct TableRow {
    pub children: Vec<TableCell>,
}

impl TableRow {
    /// Row of single-text cells
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            children: cells
                .into_iter()
                .map(|value| TableCell {
                    children: vec![TextNode::new(value)],
                })
                .collect(),
        }
    }

    /// Cell texts, in column order
    pub fn texts(&self) -> Vec<&str> {
        self.children
            .iter()
            .map(|cell| cell.children.first().map(|t| t.value.as_str()).unwrap_or(""))
            .collect()
    }
}

/// Type-specific reconstructed node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderNode {
    Heading {
        depth: u8,
        children: Vec<TextNode>,
    },
    Paragraph {
        children: Vec<TextNode>,
    },
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        asset_uid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        diagram_uid: Option<String>,
    },
    Link {
        url: String,
        title: Option<String>,
        children: Vec<TextNode>,
    },
    /// First row holds the column headers
    Table {
        children: Vec<TableRow>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePoint {
    pub line: usize,
}

/// Synthetic source position: the item's 1-based sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub start: LinePoint,
}

impl Position {
    pub fn line(line: usize) -> Self {
        Self {
            start: LinePoint { line },
        }
    }
}

/// One element of an assembled document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderItem {
    /// Reconstructed from the item's type and body
    Node {
        #[serde(flatten)]
        node: RenderNode,
        position: Position,
    },
    /// Precomputed node stored by the collector, passed through verbatim
    Ast {
        #[serde(rename = "type")]
        item_type: String,
        ast: Value,
        position: Position,
    },
}

impl RenderItem {
    pub fn line(&self) -> usize {
        match self {
            RenderItem::Node { position, .. } | RenderItem::Ast { position, .. } => {
                position.start.line
            }
        }
    }

    /// The reconstructed node, `None` for passthrough items
    pub fn node(&self) -> Option<&RenderNode> {
        match self {
            RenderItem::Node { node, .. } => Some(node),
            RenderItem::Ast { .. } => None,
        }
    }
}
