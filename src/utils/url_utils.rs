//! URL normalization utilities.
//!
//! Domain values entered by administrators are normalized here before they are
//! persisted, so the transformation engine can rely on a single well-formed
//! shape: `scheme://host[:port][/path]` with no trailing slash.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use super::constants::{HTTP_PREFIX, HTTPS_PREFIX};

/// A pasted domain that repeats its scheme, e.g. `https://https://example.com`
static DUPLICATED_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(?:https?://)+(?:https?://)")
        .expect("DUPLICATED_SCHEME: hardcoded regex is valid")
});

/// Collapse a redundant leading `http(s)://http(s)://` into one `https://`.
///
/// Strings without duplication are returned unchanged.
#[must_use]
pub fn collapse_duplicated_scheme(value: &str) -> String {
    if DUPLICATED_SCHEME.is_match(value) {
        DUPLICATED_SCHEME.replace(value, HTTPS_PREFIX).into_owned()
    } else {
        value.to_string()
    }
}

/// Normalize a custom domain for storage.
///
/// Returns `Ok("")` for blank input (rewriting disabled) and an error message
/// when the value cannot become an absolute http(s) URL with a host.
pub fn sanitize_domain(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let collapsed = collapse_duplicated_scheme(trimmed);
    let lower = collapsed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with(HTTP_PREFIX) || lower.starts_with(HTTPS_PREFIX) {
        collapsed
    } else if collapsed.contains("://") {
        return Err("only http and https domains are supported".to_string());
    } else {
        format!("{HTTPS_PREFIX}{collapsed}")
    };

    let normalized = with_scheme.trim_end_matches('/').to_string();
    if !is_valid_url(&normalized) {
        return Err("not an absolute http(s) URL with a host".to_string());
    }
    if normalized.contains(char::is_whitespace) {
        return Err("domain must not contain whitespace".to_string());
    }

    Ok(normalized)
}

/// Check if a URL is a usable http(s) URL with a host
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

/// Host (with port, when present) of an absolute URL
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
