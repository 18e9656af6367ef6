//! Item Assembler
//!
//! Rebuilds the render tree of one document from its item rows.
//!
//! # Per-type reconstruction
//!
//! - `heading` - heading node; also recorded in the heading list with a unique slug
//! - `paragraph` - paragraph with a single text child
//! - `image` / `link` - URL from the asset's relative path, else an inline data URL
//! - `code` - blob text with `lang`/`meta` from the asset
//! - `table` - blob decoded as a JSON array of objects; header row from the first object's keys
//! - anything else - dropped
//!
//! An item carrying a precomputed `ast` is passed through verbatim instead.
//!
//! Blob failures only ever degrade the item that needed the blob.

use crate::models::{
    AssetInfo, Heading, ItemContent, ItemRecord, Position, RenderItem, RenderNode, TableRow,
    TextNode,
};
use crate::services::BlobStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::asset_link::{data_url, normalize_asset_path, parse_asset_link, AssetLink};
use super::slug::{short_id, SlugTracker};

/// Assembled document body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assembly {
    pub items: Vec<RenderItem>,

    /// Every heading item, in order, whether or not it was reconstructed
    pub headings: Vec<Heading>,
}

pub struct ItemAssembler {
    blobs: Arc<BlobStore>,
}

impl ItemAssembler {
    pub fn new(blobs: Arc<BlobStore>) -> Self {
        Self { blobs }
    }

    /// Assemble `items` of the document `doc_uid`
    ///
    /// `assets` maps asset uid to asset info for this document; `doc_path` is
    /// the document's source path, used to relativize asset paths.
    pub async fn assemble(
        &self,
        items: &[ItemRecord],
        assets: &HashMap<String, AssetInfo>,
        doc_uid: &str,
        doc_path: Option<&str>,
    ) -> Assembly {
        let mut ordered: Vec<&ItemRecord> = items.iter().collect();
        ordered.sort_by_key(|item| item.order_index);

        let mut slugs = SlugTracker::new();
        let mut out = Assembly::default();

        for (index, item) in ordered.into_iter().enumerate() {
            let line = index + 1;

            if let ItemContent::Heading { level, text } = &item.content {
                let slug = slugs.unique(text);
                let uid = format!("{}#{}", doc_uid, slug);
                out.headings.push(Heading {
                    label: text.clone(),
                    sid: short_id(&uid),
                    slug,
                    uid,
                    depth: *level,
                    line,
                });
            }

            if let Some(ast) = item.ast.as_deref().and_then(|raw| decode_ast(doc_uid, raw)) {
                out.items.push(RenderItem::Ast {
                    item_type: item.content.type_name().to_string(),
                    ast,
                    position: Position::line(line),
                });
                continue;
            }

            if let Some(node) = self.build_node(&item.content, assets, doc_path).await {
                out.items.push(RenderItem::Node {
                    node,
                    position: Position::line(line),
                });
            }
        }

        out
    }

    async fn build_node(
        &self,
        content: &ItemContent,
        assets: &HashMap<String, AssetInfo>,
        doc_path: Option<&str>,
    ) -> Option<RenderNode> {
        match content {
            ItemContent::Heading { level, text } => Some(RenderNode::Heading {
                depth: *level,
                children: vec![TextNode::new(text.as_str())],
            }),
            ItemContent::Paragraph { text } => Some(RenderNode::Paragraph {
                children: vec![TextNode::new(text.as_str())],
            }),
            ItemContent::Image { body } => {
                let link = parse_asset_link(body);
                let asset = lookup(&link, assets);
                Some(RenderNode::Image {
                    url: self.asset_url(asset, doc_path).await,
                    alt: link.map(|l| l.alt).unwrap_or_else(|| "image".to_string()),
                    title: asset.and_then(|a| a.title.clone()),
                })
            }
            ItemContent::Link { body } => {
                let link = parse_asset_link(body);
                let asset = lookup(&link, assets);
                let label = link
                    .as_ref()
                    .map(|l| l.alt.clone())
                    .filter(|alt| !alt.is_empty())
                    .or_else(|| asset.and_then(|a| a.path.clone()))
                    .or_else(|| asset.map(|a| a.uid.clone()))
                    .unwrap_or_default();
                Some(RenderNode::Link {
                    url: self.asset_url(asset, doc_path).await,
                    title: asset.and_then(|a| a.title.clone()),
                    children: vec![TextNode::new(label)],
                })
            }
            ItemContent::Code { body } => {
                let link = parse_asset_link(body);
                let asset = lookup(&link, assets);
                let value = match asset {
                    Some(asset) => self
                        .bytes_for(asset)
                        .await
                        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                        .unwrap_or_default(),
                    None => String::new(),
                };
                Some(RenderNode::Code {
                    lang: asset.and_then(AssetInfo::effective_ext),
                    meta: asset.and_then(|a| a.params.clone()),
                    value,
                    asset_uid: asset.map(|a| a.uid.clone()),
                    diagram_uid: asset.map(|a| format!("{}.svg", a.uid)),
                })
            }
            ItemContent::Table { body } => {
                let link = parse_asset_link(body);
                let asset = lookup(&link, assets)?;
                let bytes = self.bytes_for(asset).await?;
                table_node(&bytes)
            }
            ItemContent::Other { type_name, .. } => {
                tracing::debug!(item_type = %type_name, "dropping item of unsupported type");
                None
            }
        }
    }

    /// Relative path when the asset has one, else an inline data URL
    async fn asset_url(&self, asset: Option<&AssetInfo>, doc_path: Option<&str>) -> String {
        let Some(asset) = asset else {
            return String::new();
        };

        if let Some(path) = asset.path.as_deref().filter(|p| !p.is_empty()) {
            return normalize_asset_path(path, doc_path);
        }

        match self.bytes_for(asset).await {
            Some(bytes) => data_url(&bytes, asset.effective_ext().as_deref()),
            None => String::new(),
        }
    }

    async fn bytes_for(&self, asset: &AssetInfo) -> Option<Vec<u8>> {
        match self.blobs.load(&asset.blob_uid).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    asset_uid = %asset.uid,
                    blob_uid = %asset.blob_uid,
                    error = %e,
                    "asset blob unavailable, degrading item"
                );
                None
            }
        }
    }
}

fn lookup<'a>(
    link: &Option<AssetLink>,
    assets: &'a HashMap<String, AssetInfo>,
) -> Option<&'a AssetInfo> {
    link.as_ref().and_then(|l| assets.get(&l.uid))
}

fn decode_ast(doc_uid: &str, raw: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(%doc_uid, error = %e, "ignoring undecodable ast");
            None
        }
    }
}

/// Header row from the first object's keys, one row per object
fn table_node(bytes: &[u8]) -> Option<RenderNode> {
    let rows: Vec<Value> = serde_json::from_slice(bytes).ok()?;
    let headers: Vec<String> = rows.first()?.as_object()?.keys().cloned().collect();
    if headers.is_empty() {
        return None;
    }

    let mut children = Vec::with_capacity(rows.len() + 1);
    children.push(TableRow::from_cells(headers.iter().cloned()));
    for row in &rows {
        children.push(TableRow::from_cells(
            headers.iter().map(|header| cell_text(row.get(header))),
        ));
    }

    Some(RenderNode::Table { children })
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
