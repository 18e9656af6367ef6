use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Heading, RenderItem};

/// Everything the serving layer needs to render one page
///
/// `found == false` means no document matched; the other fields are empty and
/// the caller answers 404.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Entry {
    pub found: bool,
    pub title: String,
    pub headings: Vec<Heading>,
    pub items: Vec<RenderItem>,

    /// Decoded `meta_data` overlaid with the document's own fields
    pub data: Map<String, Value>,
}

impl Entry {
    pub fn not_found() -> Self {
        Self::default()
    }
}
