//! Sitemap entry record

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One `<url>` record of a core sitemap.
///
/// Only `loc` is ever rewritten; `lastmod` and any provider-specific fields
/// are carried through untouched in their original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub loc: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SitemapEntry {
    pub fn new(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
