//! Navigation structures
//!
//! Derived from document URLs on every request; never persisted.

use serde::{Deserialize, Serialize};

/// One node of a section sidebar tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationNode {
    /// Normalized route path, no leading or trailing slash
    pub url: String,
    pub label: String,
    pub order: i64,

    /// True only for the node matching the current request
    pub active: bool,

    /// Present only when the node has children
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,

    /// True when the node has children
    pub parent: bool,

    /// Present only when the node has children
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<NavigationNode>>,
}

impl NavigationNode {
    pub fn children(&self) -> &[NavigationNode] {
        self.items.as_deref().unwrap_or(&[])
    }

    /// Depth-first search by url
    pub fn find(&self, url: &str) -> Option<&NavigationNode> {
        if self.url == url {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(url))
    }
}

/// Entry of the top-level (app bar) menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub url: String,
    pub label: String,
    pub order: i64,

    /// Route section this entry leads to
    pub section: String,

    pub active: bool,
}

/// Both menus for one request path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Menus {
    /// Section of the current request
    pub section: String,
    pub top_level_menu: Vec<MenuEntry>,
    pub section_tree: Vec<NavigationNode>,
}

impl Menus {
    /// Depth-first search across every root of the section tree
    pub fn find(&self, url: &str) -> Option<&NavigationNode> {
        self.section_tree.iter().find_map(|root| root.find(url))
    }
}
