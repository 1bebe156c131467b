//! Shared constants for permalink rewriting
//!
//! Option keys, default protected paths and the scheme prefixes the
//! transformation engine works with.

/// Site option: custom domain (absolute URL, no trailing slash)
pub const OPT_CUSTOM_DOMAIN: &str = "custom_domain";

/// Site option: enabled content types (map of content-type key to bool)
pub const OPT_CONTENT_TYPES: &str = "content_types";

/// Site option: protocol-relative URL conversion
pub const OPT_RELATIVE_URLS: &str = "relative_urls_enabled";

/// Site option: keep data when the plugin is uninstalled (tri-state)
pub const OPT_PRESERVE_DATA: &str = "preserve_data_on_uninstall";

/// Network option: network domain enabled
pub const OPT_NETWORK_ENABLED: &str = "enabled";

/// Network option: network domain
pub const OPT_NETWORK_DOMAIN: &str = "domain";

/// Network option: force the network domain on every site
pub const OPT_NETWORK_OVERRIDE: &str = "override";

/// Network option: protocol-relative URLs at network level
pub const OPT_NETWORK_RELATIVE_ENABLED: &str = "relative_enabled";

/// Network option: force the network relative-URL flag on every site
pub const OPT_NETWORK_RELATIVE_OVERRIDE: &str = "relative_override";

/// Network option: keep data on uninstall for sites that did not choose
pub const OPT_NETWORK_PRESERVE_DATA: &str = "preserve_data";

/// Every site-scoped key, used by teardown
pub const SITE_OPTION_KEYS: &[&str] = &[
    OPT_CUSTOM_DOMAIN,
    OPT_CONTENT_TYPES,
    OPT_RELATIVE_URLS,
    OPT_PRESERVE_DATA,
];

/// Path fragments that are never rewritten, even for bypassing callers.
///
/// Covers the admin area, authentication endpoints and core asset paths.
pub const DEFAULT_PROTECTED_PATHS: &[&str] = &[
    "/wp-admin",
    "/wp-login.php",
    "/wp-signup.php",
    "/wp-activate.php",
    "/wp-cron.php",
    "/xmlrpc.php",
    "/wp-includes/",
];

/// Referer substring that marks an API call as admin-originated
pub const DEFAULT_ADMIN_REFERER_MARKER: &str = "/wp-admin";

pub const HTTPS_PREFIX: &str = "https://";
pub const HTTP_PREFIX: &str = "http://";
pub const PROTOCOL_RELATIVE_PREFIX: &str = "//";
