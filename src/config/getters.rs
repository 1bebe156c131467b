//! Getter methods for `EngineConfig`

use super::types::EngineConfig;

impl EngineConfig {
    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    #[must_use]
    pub fn network_mode(&self) -> bool {
        self.network_mode
    }

    #[must_use]
    pub fn protected_paths(&self) -> &[String] {
        &self.protected_paths
    }

    #[must_use]
    pub fn admin_referer_marker(&self) -> &str {
        &self.admin_referer_marker
    }

    /// Host (and port) of the site URL, used for structured metadata rewriting
    #[must_use]
    pub fn site_host(&self) -> Option<String> {
        crate::utils::host_of(&self.site_url)
    }

    /// Check whether a URL touches a protected path
    ///
    /// Plain substring match: a protected fragment anywhere in the URL
    /// (path, query or an embedded redirect target) protects it.
    #[must_use]
    pub fn is_protected(&self, url: &str) -> bool {
        self.protected_paths
            .iter()
            .any(|path| !path.is_empty() && url.contains(path.as_str()))
    }
}
