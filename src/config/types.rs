//! Core configuration types for the rewriting engine

use serde::{Deserialize, Serialize};

use crate::utils::{DEFAULT_ADMIN_REFERER_MARKER, DEFAULT_PROTECTED_PATHS};

/// Host facts the engine needs to rewrite permalinks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Canonical base URL of the current site.
    ///
    /// **INVARIANT:** absolute http(s) URL without a trailing slash
    /// (normalized in the builder). Used verbatim as the substitution source.
    pub(crate) site_url: String,

    /// Installation hosts several sites under a network configuration tier
    pub(crate) network_mode: bool,

    /// URL substrings that are never rewritten
    pub(crate) protected_paths: Vec<String>,

    /// Referer substring that marks an API request as admin-originated
    pub(crate) admin_referer_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            network_mode: false,
            protected_paths: DEFAULT_PROTECTED_PATHS
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            admin_referer_marker: DEFAULT_ADMIN_REFERER_MARKER.to_string(),
        }
    }
}
