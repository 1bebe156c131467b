//! Attribute rewriting for HTML fragments using lol_html.
//!
//! Post content and paginated link markup arrive as HTML fragments. Only the
//! URL-bearing attributes are touched; everything else streams through
//! byte-for-byte.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, anyhow};
use lol_html::{HtmlRewriter, Settings, element};

/// Attributes rewritten inside content blocks
pub(crate) const CONTENT_URL_TARGETS: &[(&str, &str)] = &[("[href]", "href"), ("[src]", "src")];

/// Links inside paginated link markup
pub(crate) const PAGINATION_TARGETS: &[(&str, &str)] = &[("a[href]", "href")];

/// Rewrite attribute values in an HTML fragment.
///
/// `targets` pairs a CSS selector with the attribute to rewrite on matching
/// elements. `rewrite` returns the replacement value, or `None` to leave the
/// attribute alone.
///
/// # Returns
/// Tuple of (rewritten HTML, number of attributes rewritten)
pub(crate) fn rewrite_attributes<F>(
    html: &str,
    targets: &[(&str, &str)],
    rewrite: F,
) -> Result<(String, usize)>
where
    F: Fn(&str) -> Option<String>,
{
    let mut output = Vec::with_capacity(html.len());
    let rewrite_count = AtomicUsize::new(0);

    let rewrite = &rewrite;
    let counter = &rewrite_count;

    let handlers = targets
        .iter()
        .map(|&(selector, attr)| {
            element!(selector, move |el| {
                let replacement = match el.get_attribute(attr) {
                    Some(value) => rewrite(&value),
                    None => None,
                };
                if let Some(replacement) = replacement {
                    el.set_attribute(attr, &replacement)?;
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                Ok(())
            })
        })
        .collect::<Vec<_>>();

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: handlers,
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| anyhow!("HTML rewrite error: {}", e))?;
    rewriter
        .end()
        .map_err(|e| anyhow!("HTML rewrite finalization error: {}", e))?;

    let result = String::from_utf8(output).context("Invalid UTF-8 in rewritten HTML")?;
    let count = rewrite_count.load(Ordering::Relaxed);

    Ok((result, count))
}

/// Replace the `base` prefix of `value` with `replacement`.
///
/// The prefix must end at a URL boundary so `https://old.test` does not
/// match inside `https://old.testing.example`. A value that already starts
/// with `replacement` is left alone.
pub(crate) fn replace_base_prefix(value: &str, base: &str, replacement: &str) -> Option<String> {
    let rest = value.strip_prefix(base)?;
    if continues_host(rest) || already_replaced(rest, base, replacement) {
        return None;
    }
    Some(format!("{replacement}{rest}"))
}

/// Replace every boundary-terminated occurrence of `base` in `text`.
///
/// Occurrences that already read as `replacement` (a replacement nested
/// under `base`) are kept, so repeated passes are stable.
pub(crate) fn replace_base_everywhere(text: &str, base: &str, replacement: &str) -> String {
    if base.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find(base) {
        let start = cursor + found;
        let end = start + base.len();
        out.push_str(&text[cursor..start]);

        let rest = &text[end..];
        if continues_host(rest) {
            out.push_str(base);
            cursor = end;
        } else if already_replaced(rest, base, replacement) {
            out.push_str(replacement);
            cursor = start + replacement.len();
        } else {
            out.push_str(replacement);
            cursor = end;
        }
    }
    out.push_str(&text[cursor..]);
    out
}

/// Whether `base` followed by `rest` already spells `replacement`
fn already_replaced(rest: &str, base: &str, replacement: &str) -> bool {
    replacement
        .strip_prefix(base)
        .filter(|extra| !extra.is_empty())
        .and_then(|extra| rest.strip_prefix(extra))
        .is_some_and(|after| !continues_host(after))
}

/// Whether the text right after a matched base URL still belongs to the host
fn continues_host(rest: &str) -> bool {
    rest.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':'))
}
