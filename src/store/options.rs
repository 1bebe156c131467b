//! Typed option records
//!
//! Stored options arrive as loosely-typed JSON values. They are decoded here
//! once, with an explicit default for every key, so nothing downstream deals
//! with missing or oddly-encoded values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::preservation::PreserveData;

/// Content whose link-generation hooks can be switched on or off per site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Post,
    Page,
    Category,
    Tag,
    Author,
    Attachment,
    Archive,
    Feed,
    Search,
}

impl ContentType {
    pub const ALL: [ContentType; 9] = [
        ContentType::Post,
        ContentType::Page,
        ContentType::Category,
        ContentType::Tag,
        ContentType::Author,
        ContentType::Attachment,
        ContentType::Archive,
        ContentType::Feed,
        ContentType::Search,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ContentType::Post => "post",
            ContentType::Page => "page",
            ContentType::Category => "category",
            ContentType::Tag => "tag",
            ContentType::Author => "author",
            ContentType::Attachment => "attachment",
            ContentType::Archive => "archive",
            ContentType::Feed => "feed",
            ContentType::Search => "search",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ct| ct.key() == key)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Which content types get their permalinks rewritten. Defaults to all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeSelection {
    enabled: BTreeMap<ContentType, bool>,
}

impl Default for ContentTypeSelection {
    fn default() -> Self {
        Self {
            enabled: ContentType::ALL.into_iter().map(|ct| (ct, true)).collect(),
        }
    }
}

impl ContentTypeSelection {
    #[must_use]
    pub fn is_enabled(&self, content_type: ContentType) -> bool {
        self.enabled.get(&content_type).copied().unwrap_or(true)
    }

    pub fn set(&mut self, content_type: ContentType, enabled: bool) {
        self.enabled.insert(content_type, enabled);
    }

    #[must_use]
    pub fn with(mut self, content_type: ContentType, enabled: bool) -> Self {
        self.set(content_type, enabled);
        self
    }

    /// Enabled content types in declaration order
    pub fn enabled_types(&self) -> impl Iterator<Item = ContentType> + '_ {
        ContentType::ALL
            .into_iter()
            .filter(|ct| self.is_enabled(*ct))
    }

    /// Decode a stored map. Unknown keys are ignored, missing keys stay enabled.
    #[must_use]
    pub fn from_stored(value: Option<&Value>) -> Self {
        let mut selection = Self::default();
        if let Some(Value::Object(map)) = value {
            for (key, flag) in map {
                if let Some(ct) = ContentType::from_key(key) {
                    selection.set(ct, truthy(Some(flag)));
                }
            }
        }
        selection
    }

    #[must_use]
    pub fn to_stored(&self) -> Value {
        let map: Map<String, Value> = ContentType::ALL
            .into_iter()
            .map(|ct| (ct.key().to_string(), Value::Bool(self.is_enabled(ct))))
            .collect();
        Value::Object(map)
    }
}

/// Site-scoped options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteOptions {
    pub custom_domain: String,
    pub content_types: ContentTypeSelection,
    pub relative_urls_enabled: bool,
    pub preserve_data: PreserveData,
}

/// Network-scoped options. All false/empty outside network mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkOptions {
    pub enabled: bool,
    pub domain: String,
    pub override_sites: bool,
    pub relative_enabled: bool,
    pub relative_override: bool,
    pub preserve_data: bool,
}

/// Network domain triple exposed by the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDomainSettings {
    pub enabled: bool,
    pub domain: String,
    #[serde(rename = "override")]
    pub override_sites: bool,
}

/// Relative-URL flags from both tiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeUrlSettings {
    pub enabled_site: bool,
    pub network_enabled: bool,
    pub network_override: bool,
}

/// Interpret a stored flag the way the options API stores booleans:
/// `true`, non-zero numbers and `"1"`/`"true"`/`"yes"`/`"on"` are set.
#[must_use]
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        _ => false,
    }
}

/// Stored string, empty when missing or not a string
#[must_use]
pub fn string_or_empty(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}
