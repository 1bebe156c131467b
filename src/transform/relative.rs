//! Protocol-relative URL conversion

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::utils::{HTTP_PREFIX, HTTPS_PREFIX, PROTOCOL_RELATIVE_PREFIX};

/// Any absolute http(s) scheme that starts a URL inside free text
static ABSOLUTE_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bhttps?://").expect("ABSOLUTE_SCHEME: hardcoded regex is valid")
});

/// Replace a leading `http://` or `https://` (any case) with `//`.
///
/// Returns the input unchanged when `enabled` is false, the URL is empty, or
/// it has no http(s) scheme. Pure and idempotent; callers check the request
/// context before calling it.
#[must_use]
pub fn make_relative(url: &str, enabled: bool) -> String {
    if !enabled || url.is_empty() {
        return url.to_string();
    }

    strip_scheme(url, HTTPS_PREFIX)
        .or_else(|| strip_scheme(url, HTTP_PREFIX))
        .map_or_else(
            || url.to_string(),
            |rest| format!("{PROTOCOL_RELATIVE_PREFIX}{rest}"),
        )
}

/// Case-insensitive `strip_prefix` for an ASCII scheme
fn strip_scheme<'a>(url: &'a str, scheme: &str) -> Option<&'a str> {
    let head = url.get(..scheme.len())?;
    head.eq_ignore_ascii_case(scheme)
        .then(|| &url[scheme.len()..])
}

/// Convert every absolute http(s) URL in a text blob to protocol-relative
#[must_use]
pub fn make_all_relative(text: &str) -> Cow<'_, str> {
    ABSOLUTE_SCHEME.replace_all(text, PROTOCOL_RELATIVE_PREFIX)
}
