//! Support data checks.
//!
//! Each support key falls into exactly one of these cases:
//!
//! - expected and present: fine
//! - expected and absent: missing (error or warning, caller's choice)
//! - present, not expected, not an override: stale data (error)
//! - present, not expected, marked `override`: informational only

use crate::coin::{SupportFlags, SupportRecord};
use crate::validation::Finding;
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of a support data check
#[derive(Debug, Clone, Default)]
pub struct SupportCheck {
    pub findings: Vec<Finding>,
    /// Entries that parsed cleanly
    pub flags: BTreeMap<String, SupportFlags>,
}

impl SupportCheck {
    pub fn passed(&self) -> bool {
        !self.findings.iter().any(Finding::is_error)
    }
}

/// Structural check of one support entry
pub fn validate_support(record: &SupportRecord) -> Result<SupportFlags, Vec<String>> {
    SupportFlags::parse(record)
}

/// Check support data against the expected coin keys
///
/// `describe` turns a key into the label used in messages. Findings are
/// ordered: structural errors, then missing entries, then unknown entries and
/// overrides, each group sorted by key.
pub fn check_support(
    expected_keys: &BTreeSet<String>,
    support: &BTreeMap<String, SupportRecord>,
    fail_missing: bool,
    describe: impl Fn(&str) -> String,
) -> SupportCheck {
    let mut check = SupportCheck::default();

    for (key, record) in support {
        match validate_support(record) {
            Ok(flags) => {
                check.flags.insert(key.clone(), flags);
            }
            Err(errors) => check.findings.push(Finding::error(format!(
                "invalid support definition for {}: {}",
                describe(key),
                errors.join("; ")
            ))),
        }
    }

    for key in expected_keys {
        if !support.contains_key(key) {
            let message = format!("Missing support info for {}", describe(key));
            check.findings.push(if fail_missing {
                Finding::error(message)
            } else {
                Finding::warning(message)
            });
        }
    }

    for key in support.keys() {
        if expected_keys.contains(key) {
            continue;
        }
        let is_override = check.flags.get(key).map_or(false, |f| f.is_override);
        if is_override {
            check
                .findings
                .push(Finding::info(format!("Override present for coin {}", describe(key))));
        } else {
            check
                .findings
                .push(Finding::error(format!("Support info found for unknown coin {}", key)));
        }
    }

    check
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Severity;
    use serde_json::json;

    fn keys(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    fn support(value: serde_json::Value) -> BTreeMap<String, SupportRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn describe(key: &str) -> String {
        key.to_string()
    }

    #[test]
    fn test_known_keys_pass() {
        let expected = keys(&["bitcoin:BTC", "misc:XRP"]);
        let data = support(json!({
            "bitcoin:BTC": {"trezor1": "1.5.2", "connect": true},
            "misc:XRP": {"trezor2": "2.0.8"}
        }));

        let check = check_support(&expected, &data, true, describe);
        assert!(check.passed());
        assert!(check.findings.is_empty());
        assert_eq!(check.flags.len(), 2);
    }

    #[test]
    fn test_missing_is_warning_unless_strict() {
        let expected = keys(&["bitcoin:BTC", "bitcoin:LTC"]);
        let data = support(json!({"bitcoin:BTC": {"connect": true}}));

        let lenient = check_support(&expected, &data, false, describe);
        assert!(lenient.passed());
        assert_eq!(
            lenient.findings,
            vec![Finding::warning("Missing support info for bitcoin:LTC")]
        );

        let strict = check_support(&expected, &data, true, describe);
        assert!(!strict.passed());
        assert_eq!(
            strict.findings,
            vec![Finding::error("Missing support info for bitcoin:LTC")]
        );
    }

    #[test]
    fn test_unknown_key_is_error() {
        let expected = keys(&["bitcoin:BTC"]);
        let data = support(json!({
            "bitcoin:BTC": {"connect": true},
            "bitcoin:OLD": {"connect": false}
        }));

        let check = check_support(&expected, &data, false, describe);
        assert!(!check.passed());
        assert_eq!(
            check.findings,
            vec![Finding::error("Support info found for unknown coin bitcoin:OLD")]
        );
    }

    #[test]
    fn test_override_is_informational() {
        let expected = keys(&["bitcoin:BTC"]);
        let data = support(json!({
            "bitcoin:BTC": {"connect": true},
            "erc20:eth:FOO": {"override": true, "trezor2": "soon"}
        }));

        let check = check_support(&expected, &data, true, describe);
        assert!(check.passed());
        assert_eq!(check.findings.len(), 1);
        assert_eq!(check.findings[0].severity, Severity::Info);
        assert!(check.findings[0].message.contains("erc20:eth:FOO"));
    }

    #[test]
    fn test_structurally_invalid_entry() {
        let expected = keys(&["bitcoin:BTC"]);
        let data = support(json!({"bitcoin:BTC": {"connect": "yes", "trezor9": true}}));

        let check = check_support(&expected, &data, false, describe);
        assert!(!check.passed());
        assert_eq!(check.findings.len(), 1);
        assert!(check.findings[0]
            .message
            .starts_with("invalid support definition for bitcoin:BTC"));
        assert!(check.flags.is_empty());
    }
}
