//! Type-safe builder for `EngineConfig` using the typestate pattern
//!
//! The site URL is the only required field; `build()` is not available until
//! it has been supplied.

use anyhow::{Result, anyhow};
use std::marker::PhantomData;

use super::types::EngineConfig;
use crate::utils::{DEFAULT_ADMIN_REFERER_MARKER, DEFAULT_PROTECTED_PATHS, is_valid_url};

// Type states for the builder
pub struct WithSiteUrl;

pub struct EngineConfigBuilder<State = ()> {
    pub(crate) site_url: Option<String>,
    pub(crate) network_mode: bool,
    pub(crate) protected_paths: Vec<String>,
    pub(crate) admin_referer_marker: String,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for EngineConfigBuilder<()> {
    fn default() -> Self {
        Self {
            site_url: None,
            network_mode: false,
            protected_paths: DEFAULT_PROTECTED_PATHS
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            admin_referer_marker: DEFAULT_ADMIN_REFERER_MARKER.to_string(),
            _phantom: PhantomData,
        }
    }
}

impl EngineConfig {
    /// Create a builder for configuring an `EngineConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> EngineConfigBuilder<()> {
        EngineConfigBuilder::default()
    }
}

impl EngineConfigBuilder<()> {
    pub fn site_url(self, url: impl Into<String>) -> EngineConfigBuilder<WithSiteUrl> {
        let url_string = url.into();
        let trimmed = url_string.trim();

        // Normalize URL: add https:// if no scheme is present
        let normalized = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        EngineConfigBuilder {
            site_url: Some(normalized.trim_end_matches('/').to_string()),
            network_mode: self.network_mode,
            protected_paths: self.protected_paths,
            admin_referer_marker: self.admin_referer_marker,
            _phantom: PhantomData,
        }
    }
}

impl EngineConfigBuilder<WithSiteUrl> {
    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the site URL is not an absolute http(s) URL.
    pub fn build(self) -> Result<EngineConfig> {
        let site_url = self
            .site_url
            .ok_or_else(|| anyhow!("site_url is required"))?;

        if !is_valid_url(&site_url) {
            return Err(anyhow!("Invalid site URL '{site_url}'"));
        }

        let mut protected_paths: Vec<String> = Vec::with_capacity(self.protected_paths.len());
        for path in self.protected_paths {
            let path = path.trim().to_string();
            if !path.is_empty() && !protected_paths.contains(&path) {
                protected_paths.push(path);
            }
        }

        Ok(EngineConfig {
            site_url,
            network_mode: self.network_mode,
            protected_paths,
            admin_referer_marker: self.admin_referer_marker,
        })
    }
}
