//! Document assembly
//!
//! Turns the flat, ordered item rows of one document back into a render tree
//! plus its heading list, and nests heading lists into tables of contents.

mod assembler;
mod asset_link;
mod heading_tree;
mod mime;
mod slug;

pub use assembler::{Assembly, ItemAssembler};
pub use asset_link::{data_url, normalize_asset_path, parse_asset_link, AssetLink};
pub use heading_tree::{headings_to_tree, process_toc};
pub use mime::{file_mime, image_mime, OCTET_STREAM};
pub use slug::{short_id, slugify, SlugTracker};
