//! Effective settings resolution
//!
//! Applies network-override precedence to the store's two tiers. The domain
//! override and the relative-URL override are separate decisions driven by
//! separate flags: a network can force its domain without forcing
//! protocol-relative URLs, and the other way round.

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::store::SettingsStore;

/// Which tier an effective value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingSource {
    Site,
    NetworkOverride,
}

/// Domain the engine substitutes in; empty means no substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveDomainSetting {
    pub domain: String,
    pub source: SettingSource,
}

impl EffectiveDomainSetting {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveRelativeUrlPolicy {
    pub enabled: bool,
    pub source: SettingSource,
}

/// Both effective values, computed and cached together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSettings {
    pub domain: EffectiveDomainSetting,
    pub relative: EffectiveRelativeUrlPolicy,
}

struct Memo {
    generation: u64,
    resolved: ResolvedSettings,
}

/// Read-only view of the store that applies override precedence
pub struct SettingsResolver {
    store: Arc<SettingsStore>,
    memo: Mutex<Option<Memo>>,
}

impl SettingsResolver {
    pub fn new(store: Arc<SettingsStore>) -> Self {
        Self {
            store,
            memo: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SettingsStore> {
        &self.store
    }

    #[must_use]
    pub fn resolve_domain(&self) -> EffectiveDomainSetting {
        self.resolve().domain
    }

    #[must_use]
    pub fn resolve_relative_policy(&self) -> EffectiveRelativeUrlPolicy {
        self.resolve().relative
    }

    /// Effective settings, memoized until the store's next write
    #[must_use]
    pub fn resolve(&self) -> ResolvedSettings {
        let mut memo = self.memo.lock();
        let generation = self.store.generation();

        if let Some(cached) = memo.as_ref().filter(|m| m.generation == generation) {
            return cached.resolved.clone();
        }

        let resolved = self.resolve_uncached();
        debug!(
            "Resolved settings (generation {generation}): domain='{}' from {:?}, relative={} from {:?}",
            resolved.domain.domain,
            resolved.domain.source,
            resolved.relative.enabled,
            resolved.relative.source
        );
        *memo = Some(Memo {
            generation,
            resolved: resolved.clone(),
        });
        resolved
    }

    /// Recompute precedence from the store without reading or updating the memo
    #[must_use]
    pub fn resolve_uncached(&self) -> ResolvedSettings {
        ResolvedSettings {
            domain: self.compute_domain(),
            relative: self.compute_relative(),
        }
    }

    fn compute_domain(&self) -> EffectiveDomainSetting {
        if self.store.network_mode() {
            let network = self.store.get_network_domain_settings();
            if network.enabled && network.override_sites {
                return EffectiveDomainSetting {
                    domain: network.domain,
                    source: SettingSource::NetworkOverride,
                };
            }
        }

        EffectiveDomainSetting {
            domain: self.store.get_site_domain(),
            source: SettingSource::Site,
        }
    }

    fn compute_relative(&self) -> EffectiveRelativeUrlPolicy {
        let flags = self.store.get_relative_url_settings();

        if self.store.network_mode() && flags.network_enabled && flags.network_override {
            return EffectiveRelativeUrlPolicy {
                enabled: flags.network_enabled,
                source: SettingSource::NetworkOverride,
            };
        }

        EffectiveRelativeUrlPolicy {
            enabled: flags.enabled_site,
            source: SettingSource::Site,
        }
    }
}

impl std::fmt::Debug for SettingsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsResolver")
            .field("store", &self.store)
            .field("memoized", &self.memo.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    fn resolver(network_mode: bool) -> SettingsResolver {
        let store = SettingsStore::new(Arc::new(MemoryBackend::new()), network_mode);
        SettingsResolver::new(Arc::new(store))
    }

    #[test]
    fn test_site_domain_without_network() {
        let resolver = resolver(false);
        assert_eq!(
            resolver.resolve_domain(),
            EffectiveDomainSetting {
                domain: String::new(),
                source: SettingSource::Site,
            }
        );

        resolver.store().set_site_domain("cdn.test").unwrap();
        assert_eq!(resolver.resolve_domain().domain, "https://cdn.test");
    }

    #[test]
    fn test_network_override_requires_both_flags() {
        let resolver = resolver(true);
        let store = resolver.store();
        store.set_site_domain("site.test").unwrap();

        store.set_network_settings(true, "net.test", false).unwrap();
        assert_eq!(resolver.resolve_domain().source, SettingSource::Site);

        store.set_network_settings(false, "net.test", true).unwrap();
        assert_eq!(resolver.resolve_domain().domain, "https://site.test");

        store.set_network_settings(true, "net.test", true).unwrap();
        assert_eq!(
            resolver.resolve_domain(),
            EffectiveDomainSetting {
                domain: "https://net.test".to_string(),
                source: SettingSource::NetworkOverride,
            }
        );
    }

    #[test]
    fn test_network_override_may_force_empty_domain() {
        let resolver = resolver(true);
        resolver.store().set_site_domain("site.test").unwrap();
        resolver.store().set_network_settings(true, "", true).unwrap();

        let domain = resolver.resolve_domain();
        assert!(domain.is_empty());
        assert_eq!(domain.source, SettingSource::NetworkOverride);
    }

    #[test]
    fn test_relative_override() {
        let resolver = resolver(true);
        let store = resolver.store();

        assert!(!resolver.resolve_relative_policy().enabled);

        store.set_relative_urls(true).unwrap();
        assert_eq!(
            resolver.resolve_relative_policy(),
            EffectiveRelativeUrlPolicy {
                enabled: true,
                source: SettingSource::Site,
            }
        );

        // a network "override" with relative disabled does not force anything
        store.set_network_relative(false, true).unwrap();
        assert_eq!(resolver.resolve_relative_policy().source, SettingSource::Site);
        assert!(resolver.resolve_relative_policy().enabled);

        store.set_relative_urls(false).unwrap();
        store.set_network_relative(true, true).unwrap();
        assert_eq!(
            resolver.resolve_relative_policy(),
            EffectiveRelativeUrlPolicy {
                enabled: true,
                source: SettingSource::NetworkOverride,
            }
        );
    }

    #[test]
    fn test_memo_survives_until_write() {
        let resolver = resolver(false);
        resolver.store().set_site_domain("one.test").unwrap();
        assert_eq!(resolver.resolve_domain().domain, "https://one.test");

        resolver.store().set_site_domain("two.test").unwrap();
        assert_eq!(resolver.resolve_domain().domain, "https://two.test");
    }
}
