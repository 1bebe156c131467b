//! Host replacement inside structured metadata
//!
//! SEO payloads (head tags, JSON-LD graphs, schema fragments) carry the site
//! host in several encodings at once: plain, with either scheme,
//! protocol-relative, and with JSON-escaped slashes. The walk below rewrites
//! every string leaf in a single pass per string so a new host that contains
//! the old one is never rewritten twice.

use std::borrow::Cow;

use regex::{Captures, Regex};
use serde_json::Value;

/// Prefixes the host may appear behind, longest first
const HOST_PREFIXES: &[&str] = &[
    r"https:\/\/",
    r"http:\/\/",
    r"\/\/",
    "https://",
    "http://",
    "//",
];

/// Compiled replacement of one host by another
#[derive(Debug, Clone)]
pub struct HostReplacer {
    pattern: Regex,
    new_host: String,
}

impl HostReplacer {
    /// `None` when there is nothing to replace (empty or identical hosts)
    #[must_use]
    pub fn new(old_host: &str, new_host: &str) -> Option<Self> {
        if old_host.is_empty() || old_host == new_host {
            return None;
        }

        let prefixes = HOST_PREFIXES
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!("({prefixes})?{}", regex::escape(old_host));

        match Regex::new(&pattern) {
            Ok(pattern) => Some(Self {
                pattern,
                new_host: new_host.to_string(),
            }),
            Err(e) => {
                log::warn!("Cannot build host pattern for '{old_host}': {e}");
                None
            }
        }
    }

    #[must_use]
    pub fn replace<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(text, |caps: &Captures<'_>| {
            let prefix = caps.get(1).map_or("", |m| m.as_str());
            format!("{prefix}{}", self.new_host)
        })
    }

    /// Rewrite every string leaf of `tree`.
    ///
    /// Containers keep their type, key set and ordering; numbers, booleans and
    /// nulls pass through. Object keys are not rewritten.
    #[must_use]
    pub fn apply(&self, tree: Value) -> Value {
        match tree {
            Value::String(s) => {
                let replaced = match self.replace(&s) {
                    Cow::Borrowed(_) => None,
                    Cow::Owned(replaced) => Some(replaced),
                };
                Value::String(replaced.unwrap_or(s))
            }
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.apply(v)).collect()),
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, self.apply(value)))
                    .collect(),
            ),
            other => other,
        }
    }
}

/// Replace `old_host` with `new_host` throughout a metadata tree
#[must_use]
pub fn transform_structured(tree: Value, old_host: &str, new_host: &str) -> Value {
    match HostReplacer::new(old_host, new_host) {
        Some(replacer) => replacer.apply(tree),
        None => tree,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_encodings_in_one_string() {
        let input = json!(r##"{"@id":"https:\/\/old.test\/#org","url":"\/\/old.test\/"} https://old.test/a http://old.test //old.test old.test"##);
        let output = transform_structured(input, "old.test", "cdn.test");
        assert_eq!(
            output,
            json!(r##"{"@id":"https:\/\/cdn.test\/#org","url":"\/\/cdn.test\/"} https://cdn.test/a http://cdn.test //cdn.test cdn.test"##)
        );
    }

    #[test]
    fn test_new_host_containing_old_host_is_single_pass() {
        let output = transform_structured(json!("https://old.test/x"), "old.test", "www.old.test");
        assert_eq!(output, json!("https://www.old.test/x"));
    }

    #[test]
    fn test_shape_preserved() {
        let input = json!({
            "a": "https://old.test/x",
            "b": [1, "https://old.test/y", null],
            "c": {"nested": true, "old.test": 2.5}
        });
        let output = transform_structured(input, "old.test", "cdn.test");

        assert_eq!(
            output,
            json!({
                "a": "https://cdn.test/x",
                "b": [1, "https://cdn.test/y", null],
                "c": {"nested": true, "old.test": 2.5}
            })
        );
        let keys: Vec<_> = output.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_noop_hosts() {
        let input = json!({"a": "https://old.test"});
        assert_eq!(transform_structured(input.clone(), "", "cdn.test"), input);
        assert_eq!(transform_structured(input.clone(), "old.test", "old.test"), input);
    }
}
