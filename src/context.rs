//! Request context classification
//!
//! Administrative, scheduled and admin-referred requests must never see
//! rewritten URLs: the admin screens, login flow and internal API calls talk
//! to the site's own domain. One [`RequestContext`] is built at the top of
//! each request from the raw [`RequestSignals`] and classifies itself at most
//! once.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::utils::DEFAULT_ADMIN_REFERER_MARKER;

/// Classification of the current execution context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    /// Admin UI, in-admin AJAX, background task or admin-referred API call
    Admin,
    /// Frontend rendering, public API consumption, crawlers
    Public,
    /// Caller bypassed classification (URL tester, indexing pipeline)
    TrustedNonInteractive,
}

impl RequestClass {
    #[must_use]
    pub fn allows_rewrite(self) -> bool {
        !matches!(self, RequestClass::Admin)
    }
}

/// Raw execution-mode signals supplied by the host.
///
/// Every field is optional; an absent signal never makes a request
/// administrative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSignals {
    /// Served by the administrative UI
    pub is_admin: bool,
    /// Asynchronous callback issued from inside the admin UI
    pub is_ajax: bool,
    /// Scheduled/background task execution
    pub is_cron: bool,
    /// Request hits the public API
    pub is_rest: bool,
    /// Raw HTTP referer header, when present
    pub referer: Option<String>,
}

impl RequestSignals {
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn admin() -> Self {
        Self {
            is_admin: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ajax(mut self, value: bool) -> Self {
        self.is_ajax = value;
        self
    }

    #[must_use]
    pub fn cron(mut self, value: bool) -> Self {
        self.is_cron = value;
        self
    }

    #[must_use]
    pub fn rest(mut self, value: bool) -> Self {
        self.is_rest = value;
        self
    }

    #[must_use]
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

/// Per-request classification with a one-shot memo
#[derive(Debug)]
pub struct RequestContext {
    signals: RequestSignals,
    admin_referer_marker: String,
    class: OnceCell<RequestClass>,
}

impl RequestContext {
    pub fn new(signals: RequestSignals) -> Self {
        Self::with_marker(signals, DEFAULT_ADMIN_REFERER_MARKER)
    }

    /// Use a custom admin-path marker for the referer heuristic
    pub fn with_marker(signals: RequestSignals, marker: impl Into<String>) -> Self {
        Self {
            signals,
            admin_referer_marker: marker.into(),
            class: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn signals(&self) -> &RequestSignals {
        &self.signals
    }

    /// `Admin` or `Public`; evaluated once per context
    pub fn classify(&self) -> RequestClass {
        *self.class.get_or_init(|| {
            let class = if self.evaluate_admin() {
                RequestClass::Admin
            } else {
                RequestClass::Public
            };
            log::trace!("Request classified as {class:?}");
            class
        })
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.classify() == RequestClass::Admin
    }

    /// Classification as seen by a caller that may bypass it
    #[must_use]
    pub fn effective_class(&self, bypass: bool) -> RequestClass {
        if bypass {
            RequestClass::TrustedNonInteractive
        } else {
            self.classify()
        }
    }

    fn evaluate_admin(&self) -> bool {
        let signals = &self.signals;
        signals.is_admin || signals.is_ajax || signals.is_cron || self.admin_referred_api_call()
    }

    fn admin_referred_api_call(&self) -> bool {
        if !self.signals.is_rest || self.admin_referer_marker.is_empty() {
            return false;
        }
        self.signals
            .referer
            .as_deref()
            .is_some_and(|referer| referer.contains(self.admin_referer_marker.as_str()))
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(RequestSignals::public())
    }
}
