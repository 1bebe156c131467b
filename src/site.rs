//! Per-request assembly
//!
//! A [`Site`] lives as long as the host process and holds what is shared
//! across requests: the engine configuration, the option backend, the
//! registered cache purgers and the settings generation counter.
//! [`Site::begin_request`] builds the request-scoped pieces (store cache,
//! resolver memo, context classification) from scratch, so nothing cached in
//! one request leaks into the next. A settings write through any store of the
//! site invalidates the caches of every live request.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use crate::config::EngineConfig;
use crate::context::{RequestContext, RequestSignals};
use crate::hooks::HookPlan;
use crate::purge::PurgeCoordinator;
use crate::resolver::SettingsResolver;
use crate::store::{OptionBackend, SettingsStore};
use crate::transform::PermalinkTransformer;

#[derive(Clone)]
pub struct Site {
    config: Arc<EngineConfig>,
    backend: Arc<dyn OptionBackend>,
    purger: PurgeCoordinator,
    generation: Arc<AtomicU64>,
}

impl Site {
    pub fn new(config: EngineConfig, backend: Arc<dyn OptionBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            purger: PurgeCoordinator::new(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    #[must_use]
    pub fn with_purger(mut self, purger: PurgeCoordinator) -> Self {
        self.purger = purger;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fresh settings store for one request (or one admin action)
    #[must_use]
    pub fn settings(&self) -> Arc<SettingsStore> {
        Arc::new(
            SettingsStore::new(self.backend.clone(), self.config.network_mode())
                .with_purger(self.purger.clone())
                .with_generation(self.generation.clone()),
        )
    }

    /// Build the transformer for one incoming request
    #[must_use]
    pub fn begin_request(&self, signals: RequestSignals) -> PermalinkTransformer {
        let store = self.settings();
        let resolver = Arc::new(SettingsResolver::new(store));
        let context = Arc::new(RequestContext::with_marker(
            signals,
            self.config.admin_referer_marker(),
        ));
        PermalinkTransformer::new(self.config.clone(), resolver, context)
    }

    /// Link filters to register for the current content-type selection
    #[must_use]
    pub fn hook_plan(&self) -> HookPlan {
        HookPlan::from_selection(&self.settings().get_content_types())
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("config", &self.config)
            .field("purger", &self.purger)
            .finish_non_exhaustive()
    }
}
