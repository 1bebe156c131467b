//! Cache purge coordination
//!
//! Page caches hold rendered permalinks, so every settings write ends with a
//! purge of every registered cache system. Each external cache system is one
//! [`CachePurger`] adapter; the [`PurgeCoordinator`] runs them in registration
//! order and keeps going when one of them fails.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use anyhow::Result;
use log::{debug, warn};

/// One external cache system that can drop everything it holds
pub trait CachePurger: Send + Sync {
    /// Stable adapter name for logging and reports
    fn name(&self) -> &str;

    /// Whether the cache system is present in this installation
    fn is_available(&self) -> bool {
        true
    }

    /// Drop every cached entry
    fn purge_all(&self) -> Result<()>;
}

/// Closure-backed adapter
///
/// Lets the host application register a cache system by name without writing
/// a dedicated type for it.
pub struct FnPurger<F>
where
    F: Fn() -> Result<()> + Send + Sync,
{
    name: String,
    purge: F,
}

impl<F> FnPurger<F>
where
    F: Fn() -> Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, purge: F) -> Self {
        Self {
            name: name.into(),
            purge,
        }
    }
}

impl<F> CachePurger for FnPurger<F>
where
    F: Fn() -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn purge_all(&self) -> Result<()> {
        (self.purge)()
    }
}

/// Outcome of one coordinated purge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Adapters that purged successfully
    pub purged: Vec<String>,
    /// Adapters skipped because their cache system is absent
    pub skipped: Vec<String>,
    /// Adapters that failed, with the failure message (non-fatal)
    pub failed: Vec<(String, String)>,
}

impl PurgeReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ordered registry of cache purgers
#[derive(Clone, Default)]
pub struct PurgeCoordinator {
    purgers: Vec<Arc<dyn CachePurger>>,
}

impl PurgeCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter; adapters run in registration order
    #[must_use]
    pub fn with_purger(mut self, purger: impl CachePurger + 'static) -> Self {
        self.purgers.push(Arc::new(purger));
        self
    }

    pub fn register(&mut self, purger: Arc<dyn CachePurger>) {
        self.purgers.push(purger);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.purgers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.purgers.is_empty()
    }

    /// Purge every available cache system.
    ///
    /// Fire-and-forget: errors and panics from one adapter are logged and
    /// recorded in the report, never propagated.
    pub fn purge_all(&self) -> PurgeReport {
        let mut report = PurgeReport::default();

        for purger in &self.purgers {
            let name = purger.name().to_string();

            if !purger.is_available() {
                debug!("Cache purger '{name}' not available, skipping");
                report.skipped.push(name);
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| purger.purge_all())) {
                Ok(Ok(())) => {
                    debug!("Cache purger '{name}' purged");
                    report.purged.push(name);
                }
                Ok(Err(e)) => {
                    warn!("Cache purger '{name}' failed: {e}");
                    report.failed.push((name, e.to_string()));
                }
                Err(_) => {
                    warn!("Cache purger '{name}' panicked");
                    report.failed.push((name, "panicked".to_string()));
                }
            }
        }

        report
    }
}

impl std::fmt::Debug for PurgeCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.purgers.iter().map(|p| p.name().to_string()))
            .finish()
    }
}
