//! Builder methods available for all states

use super::builder::EngineConfigBuilder;

impl<State> EngineConfigBuilder<State> {
    /// Declare that the installation runs in network (multisite) mode.
    ///
    /// Network-level settings are ignored entirely when this is `false`.
    #[must_use]
    pub fn network_mode(mut self, enabled: bool) -> Self {
        self.network_mode = enabled;
        self
    }

    /// Protect an additional URL fragment from rewriting
    #[must_use]
    pub fn protect_path(mut self, path: impl Into<String>) -> Self {
        self.protected_paths.push(path.into());
        self
    }

    /// Replace the protected path list entirely
    #[must_use]
    pub fn protected_paths(mut self, paths: Vec<String>) -> Self {
        self.protected_paths = paths;
        self
    }

    #[must_use]
    pub fn admin_referer_marker(mut self, marker: impl Into<String>) -> Self {
        self.admin_referer_marker = marker.into();
        self
    }
}
