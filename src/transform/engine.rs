//! Permalink transformation engine
//!
//! Every entry point follows the same order:
//! 1. administrative requests are left alone unless the caller bypasses the check
//! 2. protected paths are left alone, bypass or not
//! 3. the site base URL is replaced by the effective custom domain (plain
//!    substring replacement, the site base is known and permalinks are always
//!    absolute)
//! 4. protocol-relative conversion, when the effective policy enables it
//!
//! Nothing here returns an error. Anything that cannot be rewritten safely
//! comes back unchanged.

use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;

use super::content::{
    CONTENT_URL_TARGETS, PAGINATION_TARGETS, replace_base_everywhere, replace_base_prefix,
    rewrite_attributes,
};
use super::relative::{make_all_relative, make_relative};
use super::sitemap::SitemapEntry;
use super::structured;
use crate::config::EngineConfig;
use crate::context::RequestContext;
use crate::resolver::{ResolvedSettings, SettingsResolver};
use crate::utils::{host_of, is_valid_url};

/// Rewrites permalinks for one request
pub struct PermalinkTransformer {
    config: Arc<EngineConfig>,
    resolver: Arc<SettingsResolver>,
    context: Arc<RequestContext>,
}

impl PermalinkTransformer {
    pub fn new(
        config: Arc<EngineConfig>,
        resolver: Arc<SettingsResolver>,
        context: Arc<RequestContext>,
    ) -> Self {
        Self {
            config,
            resolver,
            context,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn resolver(&self) -> &Arc<SettingsResolver> {
        &self.resolver
    }

    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Rewrite one permalink
    #[must_use]
    pub fn transform_url(&self, url: &str, bypass_context_check: bool) -> String {
        if !self.context.effective_class(bypass_context_check).allows_rewrite() {
            return url.to_string();
        }
        let settings = self.resolver.resolve();
        self.rewrite(url, &settings)
    }

    /// Rewrite even inside an admin request, for previewing settings
    #[must_use]
    pub fn transform_for_testing(&self, url: &str) -> String {
        self.transform_url(url, true)
    }

    /// Rewrite for indexing pipelines.
    ///
    /// Skips the admin check and re-resolves override precedence straight
    /// from the store instead of trusting the request memo.
    #[must_use]
    pub fn transform_for_indexing(&self, url: &str) -> String {
        let settings = self.resolver.resolve_uncached();
        self.rewrite(url, &settings)
    }

    /// Rewrite a block of post content.
    ///
    /// `href`/`src` values that start with the site URL move to the custom
    /// domain. With the relative policy on, every absolute http(s) URL in
    /// the block then becomes protocol-relative, including foreign ones and
    /// even when no custom domain is configured.
    #[must_use]
    pub fn transform_content_block(&self, html: &str) -> String {
        if html.is_empty() || self.context.is_admin() {
            return html.to_string();
        }

        let settings = self.resolver.resolve();
        let mut output = html.to_string();

        if let Some(domain) = self.usable_domain(&settings) {
            let site_url = self.config.site_url();
            let rewritten = rewrite_attributes(html, CONTENT_URL_TARGETS, |value| {
                if self.config.is_protected(value) {
                    return None;
                }
                replace_base_prefix(value, site_url, domain)
            });

            match rewritten {
                Ok((rewritten, count)) => {
                    debug!("Rewrote {count} URL attributes in content block");
                    output = rewritten;
                }
                Err(e) => warn!("Content block left unchanged: {e}"),
            }
        }

        if settings.relative.enabled {
            output = make_all_relative(&output).into_owned();
        }

        output
    }

    /// Rewrite every link in paginated link markup
    #[must_use]
    pub fn transform_pagination_links(&self, html: &str) -> String {
        if html.is_empty() || self.context.is_admin() {
            return html.to_string();
        }

        let rewritten = rewrite_attributes(html, PAGINATION_TARGETS, |href| {
            let transformed = self.transform_url(href, false);
            (transformed != href).then_some(transformed)
        });

        match rewritten {
            Ok((rewritten, _)) => rewritten,
            Err(e) => {
                warn!("Pagination markup left unchanged: {e}");
                html.to_string()
            }
        }
    }

    /// Replace one host by another throughout an SEO metadata tree
    #[must_use]
    pub fn transform_structured(&self, tree: Value, old_host: &str, new_host: &str) -> Value {
        structured::transform_structured(tree, old_host, new_host)
    }

    /// Move SEO metadata from the site host to the effective domain's host
    #[must_use]
    pub fn transform_seo_payload(&self, tree: Value) -> Value {
        if self.context.is_admin() {
            return tree;
        }

        let settings = self.resolver.resolve();
        let Some(domain) = self.usable_domain(&settings) else {
            return tree;
        };

        match (self.config.site_host(), host_of(domain)) {
            (Some(old_host), Some(new_host)) => {
                structured::transform_structured(tree, &old_host, &new_host)
            }
            _ => tree,
        }
    }

    /// Rewrite the `loc` of a sitemap entry; nothing else changes
    #[must_use]
    pub fn transform_sitemap_entry(&self, mut entry: SitemapEntry) -> SitemapEntry {
        entry.loc = self.transform_url(&entry.loc, true);
        entry
    }

    /// Steps 2-4, shared by every URL entry point
    fn rewrite(&self, url: &str, settings: &ResolvedSettings) -> String {
        if url.is_empty() || self.config.is_protected(url) {
            return url.to_string();
        }

        let substituted = match self.usable_domain(settings) {
            Some(domain) => self.substitute(url, domain),
            None => url.to_string(),
        };

        make_relative(&substituted, settings.relative.enabled)
    }

    fn substitute(&self, url: &str, domain: &str) -> String {
        let site_url = self.config.site_url();
        if site_url.is_empty() || site_url == domain {
            return url.to_string();
        }
        replace_base_everywhere(url, site_url, domain)
    }

    /// Effective domain, or `None` when empty or unusable
    fn usable_domain<'a>(&self, settings: &'a ResolvedSettings) -> Option<&'a str> {
        let domain = settings.domain.domain.as_str();
        if domain.is_empty() {
            return None;
        }
        if !is_valid_url(domain) {
            warn!("Ignoring malformed custom domain '{domain}'");
            return None;
        }
        Some(domain)
    }
}

impl std::fmt::Debug for PermalinkTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermalinkTransformer")
            .field("site_url", &self.config.site_url())
            .field("context", &self.context.signals())
            .finish_non_exhaustive()
    }
}
