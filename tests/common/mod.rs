//! Test utilities shared by the integration tests

use std::sync::Arc;

use permalink_domain::{
    EngineConfig, MemoryBackend, PermalinkTransformer, RequestSignals, SettingsStore, Site,
};

pub const SITE_URL: &str = "https://old.test";

/// Engine configuration for `https://old.test`
#[allow(dead_code)]
pub fn test_config(network_mode: bool) -> EngineConfig {
    EngineConfig::builder()
        .site_url(SITE_URL)
        .network_mode(network_mode)
        .build()
        .expect("test config is valid")
}

/// Site backed by an in-memory option store
#[allow(dead_code)]
pub fn memory_site(network_mode: bool) -> Site {
    Site::new(test_config(network_mode), Arc::new(MemoryBackend::new()))
}

/// Store for writing settings before a request starts
#[allow(dead_code)]
pub fn settings(site: &Site) -> Arc<SettingsStore> {
    site.settings()
}

#[allow(dead_code)]
pub fn public_request(site: &Site) -> PermalinkTransformer {
    site.begin_request(RequestSignals::public())
}

#[allow(dead_code)]
pub fn admin_request(site: &Site) -> PermalinkTransformer {
    site.begin_request(RequestSignals::admin())
}

/// Public request on a site whose custom domain is `https://cdn.test`
#[allow(dead_code)]
pub fn cdn_site(relative: bool) -> Site {
    let site = memory_site(false);
    let store = site.settings();
    store.set_site_domain("https://cdn.test").expect("valid domain");
    store.set_relative_urls(relative).expect("memory backend");
    site
}
