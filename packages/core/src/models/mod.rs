//! Data Models
//!
//! This module contains the data structures shared across the read path:
//!
//! - `Document` / `DocumentMatch` - Versioned content pages and how to address them
//! - `ItemRecord` / `ItemContent` - Ordered content units, one variant per item type
//! - `AssetInfo` / `BlobRecord` - Named asset pointers and content-addressed payloads
//! - `RenderItem` - Assembled render tree nodes
//! - `Heading` / `TocNode` - Extracted headings and the in-page table of contents
//! - `NavigationNode` / `MenuEntry` - Derived navigation structures
//! - `Entry` - What the serving layer receives for one page

mod asset;
mod blob;
mod document;
mod entry;
mod heading;
mod item;
mod navigation;
mod render;

pub use asset::AssetInfo;
pub use blob::BlobRecord;
pub use document::{Document, DocumentMatch, DocumentSummary, NavDocument, VersionId};
pub use entry::Entry;
pub use heading::{Heading, TocMenu, TocNode};
pub use item::{ItemContent, ItemRecord};
pub use navigation::{MenuEntry, Menus, NavigationNode};
pub use render::{LinePoint, Position, RenderItem, RenderNode, TableCell, TableRow, TextNode};
