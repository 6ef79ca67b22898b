//! Coin registry records.
//!
//! The registry loader produces these records once per run; everything
//! downstream treats them as read-only. Fields mirror the names used in the
//! registry JSON so records deserialize directly with serde.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

pub mod support;

pub use support::{DeviceSupport, SupportFlags, SupportRecord};

/// A bitcoin-like coin definition.
///
/// Everything except `key` is optional at the type level: a missing required
/// field is a validation finding, not a parse failure. Keys the registry
/// carries that are not modelled here land in `extensions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_shortcut: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type_p2sh: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxfee_kb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minfee_kb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_message_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_genesis_block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xprv_magic: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpub_magic: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpub_magic_segwit_p2sh: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpub_magic_segwit_native: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bech32_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashaddr_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slip44: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segwit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decred: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_bip143: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bip115: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dust_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_address_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_address_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocktime_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<u64>,
    /// Icon image path, resolved against the registry directory by the loader
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blockbook: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bitcore: Vec<String>,
    /// Registry keys with no typed counterpart. Never encoded into definitions.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

/// Value of a single record field, as seen by schema-driven encoders
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Uint(u64),
    Bool(bool),
    Str(&'a str),
    Strings(&'a [String]),
}

impl CoinRecord {
    /// Display name, falling back to the key for records without a name
    pub fn name(&self) -> &str {
        self.coin_name.as_deref().unwrap_or(&self.key)
    }

    /// All backend endpoints (blockbook first, then bitcore)
    pub fn backends(&self) -> impl Iterator<Item = &str> {
        self.blockbook
            .iter()
            .chain(self.bitcore.iter())
            .map(String::as_str)
    }

    /// Look up a field by its registry name.
    ///
    /// Returns `None` both for absent optional fields and for names this
    /// record type does not know. Repeated fields always return a value.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        use FieldValue::*;
        let s: fn(&Option<String>) -> Option<FieldValue<'_>> = |v| v.as_deref().map(Str);
        let u = |v: &Option<u64>| v.map(Uint);
        let b = |v: &Option<bool>| v.map(Bool);
        match name {
            "coin_name" => s(&self.coin_name),
            "coin_shortcut" => s(&self.coin_shortcut),
            "coin_label" => s(&self.coin_label),
            "curve_name" => s(&self.curve_name),
            "address_type" => u(&self.address_type),
            "address_type_p2sh" => u(&self.address_type_p2sh),
            "maxfee_kb" => u(&self.maxfee_kb),
            "minfee_kb" => u(&self.minfee_kb),
            "signed_message_header" => s(&self.signed_message_header),
            "hash_genesis_block" => s(&self.hash_genesis_block),
            "xprv_magic" => u(&self.xprv_magic),
            "xpub_magic" => u(&self.xpub_magic),
            "xpub_magic_segwit_p2sh" => u(&self.xpub_magic_segwit_p2sh),
            "xpub_magic_segwit_native" => u(&self.xpub_magic_segwit_native),
            "bech32_prefix" => s(&self.bech32_prefix),
            "cashaddr_prefix" => s(&self.cashaddr_prefix),
            "slip44" => u(&self.slip44),
            "segwit" => b(&self.segwit),
            "decred" => b(&self.decred),
            "fork_id" => u(&self.fork_id),
            "force_bip143" => b(&self.force_bip143),
            "bip115" => b(&self.bip115),
            "dust_limit" => u(&self.dust_limit),
            "uri_prefix" => s(&self.uri_prefix),
            "min_address_length" => u(&self.min_address_length),
            "max_address_length" => u(&self.max_address_length),
            "website" => s(&self.website),
            "github" => s(&self.github),
            "maintainer" => s(&self.maintainer),
            "blocktime_seconds" => u(&self.blocktime_seconds),
            "cooldown" => u(&self.cooldown),
            "blockbook" => Some(Strings(&self.blockbook)),
            "bitcore" => Some(Strings(&self.bitcore)),
            _ => None,
        }
    }
}

/// A non-bitcoin-like coin that still expects support information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiscCoin {
    pub key: String,
    pub name: String,
}

/// A registry entry that could not be read into a [`CoinRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// The entry's `key`, or its position when it has none
    pub key: String,
    pub error: String,
}

/// Everything the core consumes from the registry loader
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Bitcoin-like coins in registry order
    pub coins: Vec<CoinRecord>,
    /// Entries that failed to parse; reported as errors by the check
    pub rejected: Vec<RejectedRecord>,
    pub misc: Vec<MiscCoin>,
    pub support: BTreeMap<String, SupportRecord>,
}

impl Registry {
    /// Keys that must carry support information (bitcoin-like and misc)
    ///
    /// Rejected entries still count: their support data is not stale.
    pub fn expected_keys(&self) -> BTreeSet<String> {
        self.coins
            .iter()
            .map(|c| c.key.clone())
            .chain(self.rejected.iter().map(|r| r.key.clone()))
            .chain(self.misc.iter().map(|m| m.key.clone()))
            .collect()
    }

    /// Human-readable label for a key, used in findings
    pub fn describe_key(&self, key: &str) -> String {
        let name = self
            .coins
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.name().to_string())
            .or_else(|| self.misc.iter().find(|m| m.key == key).map(|m| m.name.clone()));
        match name {
            Some(name) => format!("{} ({})", key, name),
            None => format!("{} <unknown key>", key),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_parsing_captures_extensions() {
        let json = r#"{
            "key": "bitcoin:BTC",
            "coin_name": "Bitcoin",
            "address_type": 0,
            "segwit": true,
            "blockbook": ["https://btc1.example.com"],
            "default_fee_b": {"Normal": 10}
        }"#;

        let coin: CoinRecord = serde_json::from_str(json).unwrap();
        assert_eq!(coin.key, "bitcoin:BTC");
        assert_eq!(coin.name(), "Bitcoin");
        assert_eq!(coin.address_type, Some(0));
        assert_eq!(coin.segwit, Some(true));
        assert_eq!(coin.blockbook.len(), 1);
        assert!(coin.bitcore.is_empty());
        assert!(coin.extensions.contains_key("default_fee_b"));
        assert!(!coin.extensions.contains_key("coin_name"));
    }

    #[test]
    fn test_field_lookup() {
        let coin = CoinRecord {
            key: "bitcoin:BTC".to_string(),
            coin_name: Some("Bitcoin".to_string()),
            address_type: Some(0),
            segwit: Some(false),
            ..Default::default()
        };

        assert_eq!(coin.field("coin_name"), Some(FieldValue::Str("Bitcoin")));
        assert_eq!(coin.field("address_type"), Some(FieldValue::Uint(0)));
        assert_eq!(coin.field("segwit"), Some(FieldValue::Bool(false)));
        assert_eq!(coin.field("slip44"), None);
        assert_eq!(coin.field("no_such_field"), None);
        assert_eq!(coin.field("bitcore"), Some(FieldValue::Strings(&[])));
    }

    #[test]
    fn test_expected_keys_and_descriptions() {
        let registry = Registry {
            coins: vec![CoinRecord {
                key: "bitcoin:BTC".to_string(),
                coin_name: Some("Bitcoin".to_string()),
                ..Default::default()
            }],
            misc: vec![MiscCoin {
                key: "misc:XRP".to_string(),
                name: "Ripple".to_string(),
            }],
            ..Default::default()
        };

        let expected = registry.expected_keys();
        assert_eq!(expected.len(), 2);
        assert!(expected.contains("misc:XRP"));
        assert_eq!(registry.describe_key("bitcoin:BTC"), "bitcoin:BTC (Bitcoin)");
        assert_eq!(registry.describe_key("misc:XRP"), "misc:XRP (Ripple)");
        assert_eq!(registry.describe_key("erc20:eth:FOO"), "erc20:eth:FOO <unknown key>");
    }
}
