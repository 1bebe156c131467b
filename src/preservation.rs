//! Data preservation policy for uninstall
//!
//! A site keeps or drops its stored options on uninstall according to its own
//! tri-state flag, falling back to the network flag only when the site never
//! chose. An explicit site opt-out wins over a network-wide "preserve".

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Site-level preserve-data flag as stored (`unset | 0 | 1`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreserveData {
    /// Site has not chosen; the network flag decides
    #[default]
    Unset,
    /// Explicit opt-out (`0`)
    Delete,
    /// Explicit opt-in (`1`)
    Preserve,
}

impl PreserveData {
    /// Decode the stored representation.
    ///
    /// Accepts the numeric/string/bool encodings the option has been written
    /// with; anything unrecognized reads as `Unset`.
    #[must_use]
    pub fn from_stored(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Bool(true)) => PreserveData::Preserve,
            Some(Value::Bool(false)) => PreserveData::Delete,
            Some(Value::Number(n)) => match n.as_i64() {
                Some(1) => PreserveData::Preserve,
                Some(0) => PreserveData::Delete,
                _ => PreserveData::Unset,
            },
            Some(Value::String(s)) => match s.trim() {
                "1" | "preserve" => PreserveData::Preserve,
                "0" | "delete" => PreserveData::Delete,
                _ => PreserveData::Unset,
            },
            _ => PreserveData::Unset,
        }
    }

    /// Stored representation; `None` means the key is deleted
    #[must_use]
    pub fn to_stored(self) -> Option<Value> {
        match self {
            PreserveData::Unset => None,
            PreserveData::Delete => Some(Value::from(0)),
            PreserveData::Preserve => Some(Value::from(1)),
        }
    }
}

/// Decide whether a site's data survives uninstall
#[must_use]
pub fn should_preserve(site: PreserveData, network_preserve: bool) -> bool {
    match site {
        PreserveData::Preserve => true,
        PreserveData::Delete => false,
        PreserveData::Unset => network_preserve,
    }
}

/// What `SettingsStore::teardown_site` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownOutcome {
    /// Options kept because the policy says preserve
    Preserved,
    /// Site options deleted; lists the keys removed
    Deleted(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_precedence_table() {
        assert!(should_preserve(PreserveData::Preserve, false));
        assert!(should_preserve(PreserveData::Preserve, true));
        assert!(!should_preserve(PreserveData::Delete, true));
        assert!(!should_preserve(PreserveData::Delete, false));
        assert!(should_preserve(PreserveData::Unset, true));
        assert!(!should_preserve(PreserveData::Unset, false));
    }

    #[test]
    fn test_stored_encodings() {
        assert_eq!(PreserveData::from_stored(None), PreserveData::Unset);
        assert_eq!(PreserveData::from_stored(Some(&json!(1))), PreserveData::Preserve);
        assert_eq!(PreserveData::from_stored(Some(&json!("0"))), PreserveData::Delete);
        assert_eq!(PreserveData::from_stored(Some(&json!(false))), PreserveData::Delete);
        assert_eq!(PreserveData::from_stored(Some(&json!(""))), PreserveData::Unset);
        assert_eq!(PreserveData::from_stored(Some(&json!(7))), PreserveData::Unset);

        for flag in [PreserveData::Unset, PreserveData::Delete, PreserveData::Preserve] {
            assert_eq!(PreserveData::from_stored(flag.to_stored().as_ref()), flag);
        }
    }
}
