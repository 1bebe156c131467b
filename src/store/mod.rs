//! Two-tier settings store
//!
//! Owns every persisted option (site tier and, in network mode, network tier)
//! and a per-request cache of the decoded values. Every write validates its
//! input, persists it, drops the whole cache in one step, bumps the
//! generation counter the resolver keys its memo on, and finally asks the
//! purge coordinator to flush external caches.
//!
//! Stores built for the same site share one generation counter. A write
//! through any of them moves the counter, and every other store drops its
//! cache on its next read.
//!
//! Reads never fail. A backend error is logged and the affected tier reads as
//! its defaults for the rest of the request.

pub mod backend;
pub mod options;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;

pub use backend::{JsonFileBackend, MemoryBackend, OptionBackend, OptionScope};
pub use options::{
    ContentType, ContentTypeSelection, NetworkDomainSettings, NetworkOptions,
    RelativeUrlSettings, SiteOptions,
};

use crate::error::{SettingsError, SettingsResult};
use crate::preservation::{PreserveData, TeardownOutcome, should_preserve};
use crate::purge::{PurgeCoordinator, PurgeReport};
use crate::utils::{
    OPT_CONTENT_TYPES, OPT_CUSTOM_DOMAIN, OPT_NETWORK_DOMAIN, OPT_NETWORK_ENABLED,
    OPT_NETWORK_OVERRIDE, OPT_NETWORK_PRESERVE_DATA, OPT_NETWORK_RELATIVE_ENABLED,
    OPT_NETWORK_RELATIVE_OVERRIDE, OPT_PRESERVE_DATA, OPT_RELATIVE_URLS, SITE_OPTION_KEYS,
    sanitize_domain,
};
use options::{string_or_empty, truthy};

#[derive(Debug, Default)]
struct StoreCache {
    /// Generation the cached values were loaded under
    generation: u64,
    site: Option<SiteOptions>,
    network: Option<NetworkOptions>,
}

/// Settings store for one site
pub struct SettingsStore {
    backend: Arc<dyn OptionBackend>,
    network_mode: bool,
    purger: PurgeCoordinator,
    cache: Mutex<StoreCache>,
    /// Bumped on every invalidation; derived caches compare against it
    generation: Arc<AtomicU64>,
}

impl SettingsStore {
    pub fn new(backend: Arc<dyn OptionBackend>, network_mode: bool) -> Self {
        Self {
            backend,
            network_mode,
            purger: PurgeCoordinator::new(),
            cache: Mutex::new(StoreCache::default()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Share a generation counter with the other stores of the same site
    #[must_use]
    pub fn with_generation(mut self, generation: Arc<AtomicU64>) -> Self {
        self.cache.get_mut().generation = generation.load(Ordering::Acquire);
        self.generation = generation;
        self
    }

    /// Attach the cache purgers run after every write
    #[must_use]
    pub fn with_purger(mut self, purger: PurgeCoordinator) -> Self {
        self.purger = purger;
        self
    }

    #[must_use]
    pub fn network_mode(&self) -> bool {
        self.network_mode
    }

    /// Current cache generation
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    // ----- reads -------------------------------------------------------

    /// All site-scoped options, decoded with defaults
    #[must_use]
    pub fn site_options(&self) -> SiteOptions {
        let mut cache = self.current_cache();
        if let Some(site) = &cache.site {
            return site.clone();
        }
        let site = self.load_site();
        cache.site = Some(site.clone());
        site
    }

    /// All network-scoped options; defaults outside network mode
    #[must_use]
    pub fn network_options(&self) -> NetworkOptions {
        if !self.network_mode {
            return NetworkOptions::default();
        }
        let mut cache = self.current_cache();
        if let Some(network) = &cache.network {
            return network.clone();
        }
        let network = self.load_network();
        cache.network = Some(network.clone());
        network
    }

    #[must_use]
    pub fn get_site_domain(&self) -> String {
        self.site_options().custom_domain
    }

    #[must_use]
    pub fn get_network_domain_settings(&self) -> NetworkDomainSettings {
        let network = self.network_options();
        NetworkDomainSettings {
            enabled: network.enabled,
            domain: network.domain,
            override_sites: network.override_sites,
        }
    }

    #[must_use]
    pub fn get_relative_url_settings(&self) -> RelativeUrlSettings {
        let site = self.site_options();
        let network = self.network_options();
        RelativeUrlSettings {
            enabled_site: site.relative_urls_enabled,
            network_enabled: network.relative_enabled,
            network_override: network.relative_override,
        }
    }

    #[must_use]
    pub fn get_content_types(&self) -> ContentTypeSelection {
        self.site_options().content_types
    }

    #[must_use]
    pub fn get_site_preserve_data(&self) -> PreserveData {
        self.site_options().preserve_data
    }

    #[must_use]
    pub fn get_network_preserve_data(&self) -> bool {
        self.network_options().preserve_data
    }

    // ----- writes ------------------------------------------------------

    /// Store the site's custom domain. Blank input disables rewriting.
    ///
    /// # Errors
    ///
    /// `InvalidDomain` when the value cannot be normalized; nothing is written.
    pub fn set_site_domain(&self, value: &str) -> SettingsResult<String> {
        let domain = validate_domain(value)?;
        self.write(&[(OptionScope::Site, OPT_CUSTOM_DOMAIN, Some(Value::from(domain.clone())))])?;
        info!("Site custom domain set to '{domain}'");
        Ok(domain)
    }

    /// Store the network domain triple
    ///
    /// # Errors
    ///
    /// `NotNetworkMode` on single-site installs, `InvalidDomain` for a bad domain.
    pub fn set_network_settings(
        &self,
        enabled: bool,
        domain: &str,
        override_sites: bool,
    ) -> SettingsResult<String> {
        self.require_network_mode(OPT_NETWORK_DOMAIN)?;
        let domain = validate_domain(domain)?;
        self.write(&[
            (OptionScope::Network, OPT_NETWORK_ENABLED, Some(Value::Bool(enabled))),
            (OptionScope::Network, OPT_NETWORK_DOMAIN, Some(Value::from(domain.clone()))),
            (OptionScope::Network, OPT_NETWORK_OVERRIDE, Some(Value::Bool(override_sites))),
        ])?;
        info!(
            "Network domain settings written: enabled={enabled}, domain='{domain}', override={override_sites}"
        );
        Ok(domain)
    }

    pub fn set_relative_urls(&self, enabled: bool) -> SettingsResult<()> {
        self.write(&[(OptionScope::Site, OPT_RELATIVE_URLS, Some(Value::Bool(enabled)))])
    }

    pub fn set_network_relative(&self, enabled: bool, override_sites: bool) -> SettingsResult<()> {
        self.require_network_mode(OPT_NETWORK_RELATIVE_ENABLED)?;
        self.write(&[
            (OptionScope::Network, OPT_NETWORK_RELATIVE_ENABLED, Some(Value::Bool(enabled))),
            (
                OptionScope::Network,
                OPT_NETWORK_RELATIVE_OVERRIDE,
                Some(Value::Bool(override_sites)),
            ),
        ])
    }

    pub fn set_content_types(&self, selection: &ContentTypeSelection) -> SettingsResult<()> {
        self.write(&[(OptionScope::Site, OPT_CONTENT_TYPES, Some(selection.to_stored()))])
    }

    pub fn set_site_preserve_data(&self, flag: PreserveData) -> SettingsResult<()> {
        self.write(&[(OptionScope::Site, OPT_PRESERVE_DATA, flag.to_stored())])
    }

    pub fn set_network_preserve_data(&self, preserve: bool) -> SettingsResult<()> {
        self.require_network_mode(OPT_NETWORK_PRESERVE_DATA)?;
        self.write(&[(
            OptionScope::Network,
            OPT_NETWORK_PRESERVE_DATA,
            Some(Value::Bool(preserve)),
        )])
    }

    /// Drop every cached value, forcing the next read to hit storage
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        *cache = StoreCache {
            generation,
            ..StoreCache::default()
        };
    }

    /// Lifecycle teardown for this site (uninstall).
    ///
    /// Deletes the site's options unless the preservation policy keeps them.
    /// Network options are never touched here.
    pub fn teardown_site(&self) -> SettingsResult<TeardownOutcome> {
        let site = self.get_site_preserve_data();
        let network = self.get_network_preserve_data();

        if should_preserve(site, network) {
            info!("Preserving site options on teardown (site={site:?}, network={network})");
            return Ok(TeardownOutcome::Preserved);
        }

        let writes: Vec<(OptionScope, &str, Option<Value>)> = SITE_OPTION_KEYS
            .iter()
            .map(|key| (OptionScope::Site, *key, None))
            .collect();
        self.write(&writes)?;

        info!("Deleted {} site options on teardown", writes.len());
        Ok(TeardownOutcome::Deleted(
            SITE_OPTION_KEYS.iter().map(|k| (*k).to_string()).collect(),
        ))
    }

    // ----- internals ---------------------------------------------------

    /// Lock the cache, dropping it first if another store wrote since it was filled
    fn current_cache(&self) -> MutexGuard<'_, StoreCache> {
        let mut cache = self.cache.lock();
        let generation = self.generation();
        if cache.generation != generation {
            debug!("Settings changed elsewhere (generation {generation}), dropping cache");
            *cache = StoreCache {
                generation,
                ..StoreCache::default()
            };
        }
        cache
    }

    fn require_network_mode(&self, key: &'static str) -> SettingsResult<()> {
        if self.network_mode {
            Ok(())
        } else {
            Err(SettingsError::NotNetworkMode(key))
        }
    }

    /// Persist a batch of values (`None` deletes), then invalidate and purge.
    ///
    /// The cache is invalidated even when the backend fails part-way, so a
    /// partially applied batch is never masked by stale cached values.
    fn write(&self, writes: &[(OptionScope, &str, Option<Value>)]) -> SettingsResult<()> {
        let mut result = Ok(());
        for (scope, key, value) in writes {
            let outcome = match value {
                Some(v) => self.backend.set(*scope, key, v.clone()),
                None => self.backend.delete(*scope, key),
            };
            if let Err(e) = outcome {
                warn!("Failed to write {scope} option '{key}': {e}");
                result = Err(SettingsError::from(e));
                break;
            }
        }

        self.invalidate();
        let report = self.purge();
        debug!(
            "Settings write purged {} caches ({} failed)",
            report.purged.len(),
            report.failed.len()
        );
        result
    }

    fn purge(&self) -> PurgeReport {
        self.purger.purge_all()
    }

    /// `None` when the backend failed (logged); `Some(None)` when never written
    fn read(&self, scope: OptionScope, key: &str) -> Option<Option<Value>> {
        match self.backend.get(scope, key) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to read {scope} option '{key}', using defaults: {e}");
                None
            }
        }
    }

    fn load_site(&self) -> SiteOptions {
        let scope = OptionScope::Site;
        let mut site = SiteOptions::default();

        let reads = (
            self.read(scope, OPT_CUSTOM_DOMAIN),
            self.read(scope, OPT_CONTENT_TYPES),
            self.read(scope, OPT_RELATIVE_URLS),
            self.read(scope, OPT_PRESERVE_DATA),
        );
        if let (Some(domain), Some(types), Some(relative), Some(preserve)) = reads {
            site.custom_domain = string_or_empty(domain.as_ref());
            site.content_types = ContentTypeSelection::from_stored(types.as_ref());
            site.relative_urls_enabled = truthy(relative.as_ref());
            site.preserve_data = PreserveData::from_stored(preserve.as_ref());
        }

        debug!("Loaded site options: domain='{}'", site.custom_domain);
        site
    }

    fn load_network(&self) -> NetworkOptions {
        let scope = OptionScope::Network;
        let mut network = NetworkOptions::default();

        let reads = (
            self.read(scope, OPT_NETWORK_ENABLED),
            self.read(scope, OPT_NETWORK_DOMAIN),
            self.read(scope, OPT_NETWORK_OVERRIDE),
            self.read(scope, OPT_NETWORK_RELATIVE_ENABLED),
            self.read(scope, OPT_NETWORK_RELATIVE_OVERRIDE),
            self.read(scope, OPT_NETWORK_PRESERVE_DATA),
        );
        if let (
            Some(enabled),
            Some(domain),
            Some(override_sites),
            Some(rel),
            Some(rel_override),
            Some(preserve),
        ) = reads
        {
            network.enabled = truthy(enabled.as_ref());
            network.domain = string_or_empty(domain.as_ref());
            network.override_sites = truthy(override_sites.as_ref());
            network.relative_enabled = truthy(rel.as_ref());
            network.relative_override = truthy(rel_override.as_ref());
            network.preserve_data = truthy(preserve.as_ref());
        }

        debug!(
            "Loaded network options: enabled={}, override={}",
            network.enabled, network.override_sites
        );
        network
    }
}

fn validate_domain(value: &str) -> SettingsResult<String> {
    sanitize_domain(value).map_err(|reason| SettingsError::InvalidDomain {
        value: value.to_string(),
        reason,
    })
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("network_mode", &self.network_mode)
            .field("purger", &self.purger)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
