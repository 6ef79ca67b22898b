//! Single-record consistency checks.

use crate::coin::{CoinRecord, MiscCoin};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static SHORTCUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^t?[A-Z0-9]{2,10}$").expect("valid shortcut regex"));
static URI_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+$").expect("valid uri prefix regex"));
static GENESIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{64}$").expect("valid genesis regex"));

/// Declared byte widths of numeric chain parameters
const NUMERIC_WIDTHS: &[(&str, u32)] = &[
    ("address_type", 4),
    ("address_type_p2sh", 4),
    ("xprv_magic", 4),
    ("xpub_magic", 4),
    ("xpub_magic_segwit_p2sh", 4),
    ("xpub_magic_segwit_native", 4),
    ("fork_id", 1),
    ("min_address_length", 1),
    ("max_address_length", 1),
];

/// SLIP-44 indices are hardened, so the top bit is reserved
const SLIP44_LIMIT: u64 = 1 << 31;

/// Validate one bitcoin-like coin record
///
/// Returns every violation found, in check order. An empty list means the
/// record is internally consistent.
pub fn validate_record(coin: &CoinRecord) -> Vec<String> {
    let mut errors = Vec::new();

    // Required fields
    let required_strings = [
        ("coin_name", &coin.coin_name),
        ("coin_shortcut", &coin.coin_shortcut),
        ("coin_label", &coin.coin_label),
        ("curve_name", &coin.curve_name),
        ("signed_message_header", &coin.signed_message_header),
        ("hash_genesis_block", &coin.hash_genesis_block),
    ];
    for (name, value) in required_strings {
        if value.is_none() {
            errors.push(format!("{} must be defined", name));
        }
    }
    let required_numbers = [
        ("address_type", coin.address_type),
        ("address_type_p2sh", coin.address_type_p2sh),
        ("maxfee_kb", coin.maxfee_kb),
        ("minfee_kb", coin.minfee_kb),
        ("xpub_magic", coin.xpub_magic),
        ("slip44", coin.slip44),
    ];
    for (name, value) in required_numbers {
        if value.is_none() {
            errors.push(format!("{} must be defined", name));
        }
    }

    // Byte-width ranges
    for &(name, width) in NUMERIC_WIDTHS {
        if let Some(crate::coin::FieldValue::Uint(value)) = coin.field(name) {
            let limit = 1u64 << (8 * width);
            if value >= limit {
                errors.push(format!(
                    "{} {:#x} does not fit in {} byte(s)",
                    name, value, width
                ));
            }
        }
    }
    if let Some(slip44) = coin.slip44 {
        if slip44 >= SLIP44_LIMIT {
            errors.push(format!("slip44 {} must be below 2^31", slip44));
        }
    }

    if let (Some(p2pkh), Some(p2sh)) = (coin.address_type, coin.address_type_p2sh) {
        if p2pkh == p2sh {
            errors.push("address_type must not be equal to address_type_p2sh".to_string());
        }
    }

    if let (Some(max), Some(min)) = (coin.maxfee_kb, coin.minfee_kb) {
        if max < min {
            errors.push("max fee must not be smaller than min fee".to_string());
        }
    }

    // Mutually dependent fields
    if coin.segwit == Some(true) {
        if coin.bech32_prefix.is_none() {
            errors.push("bech32_prefix must be defined for segwit-enabled coin".to_string());
        }
        if coin.xpub_magic_segwit_p2sh.is_none() {
            errors.push(
                "xpub_magic_segwit_p2sh must be defined for segwit-enabled coin".to_string(),
            );
        }
    } else {
        if coin.bech32_prefix.is_some() {
            errors.push("bech32_prefix must not be defined for segwit-disabled coin".to_string());
        }
        if coin.xpub_magic_segwit_p2sh.is_some() {
            errors.push(
                "xpub_magic_segwit_p2sh must not be defined for segwit-disabled coin".to_string(),
            );
        }
        if coin.xpub_magic_segwit_native.is_some() {
            errors.push(
                "xpub_magic_segwit_native must not be defined for segwit-disabled coin"
                    .to_string(),
            );
        }
    }
    if coin.cashaddr_prefix.is_some() && coin.fork_id.is_none() {
        errors.push("cashaddr_prefix requires fork_id to be defined".to_string());
    }

    // Formats
    if let Some(hash) = &coin.hash_genesis_block {
        if !GENESIS_RE.is_match(hash) {
            errors.push("hash_genesis_block must be 32 bytes of hex".to_string());
        }
    }
    if let Some(header) = &coin.signed_message_header {
        if header.is_empty() {
            errors.push("signed_message_header must not be empty".to_string());
        }
    }
    if let Some(shortcut) = &coin.coin_shortcut {
        if !SHORTCUT_RE.is_match(shortcut) {
            errors.push(format!("coin_shortcut '{}' has an invalid format", shortcut));
        }
    }
    if let Some(prefix) = &coin.uri_prefix {
        if !URI_PREFIX_RE.is_match(prefix) {
            errors.push(format!("uri_prefix '{}' must be lowercase letters", prefix));
        }
    }
    if let Some(website) = &coin.website {
        if !website.starts_with("https://") {
            errors.push("website must start with https://".to_string());
        }
    }
    if let Some(github) = &coin.github {
        if !github.starts_with("https://github.com/") {
            errors.push("github must start with https://github.com/".to_string());
        }
    }
    for backend in coin.backends() {
        if !backend.starts_with("https://") && !backend.starts_with("http://") {
            errors.push(format!("backend '{}' must be an http(s) URL", backend));
        }
    }
    if let (Some(min), Some(max)) = (coin.min_address_length, coin.max_address_length) {
        if min > max {
            errors.push(
                "min_address_length must not be larger than max_address_length".to_string(),
            );
        }
    }

    errors
}

/// Find keys that appear more than once across bitcoin-like and misc coins
///
/// Each duplicated key is reported once, in order of first appearance.
pub fn find_duplicate_keys(coins: &[CoinRecord], misc: &[MiscCoin]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut order = Vec::new();

    for key in coins.iter().map(|c| c.key.as_str()).chain(misc.iter().map(|m| m.key.as_str())) {
        let count = counts.entry(key).or_insert(0);
        if *count == 1 {
            order.push(key.to_string());
        }
        *count += 1;
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::fixtures::bitcoin;

    #[test]
    fn test_consistent_record_is_valid() {
        assert!(validate_record(&bitcoin()).is_empty());
    }

    #[test]
    fn test_missing_required_fields() {
        let coin = CoinRecord {
            key: "bitcoin:EMPTY".to_string(),
            ..Default::default()
        };

        let errors = validate_record(&coin);
        assert!(errors.contains(&"coin_name must be defined".to_string()));
        assert!(errors.contains(&"address_type must be defined".to_string()));
        assert!(errors.contains(&"slip44 must be defined".to_string()));
        assert_eq!(errors.len(), 12);
    }

    #[test]
    fn test_equal_address_types() {
        let mut coin = bitcoin();
        coin.address_type_p2sh = Some(0);
        assert_eq!(
            validate_record(&coin),
            vec!["address_type must not be equal to address_type_p2sh".to_string()]
        );
    }

    #[test]
    fn test_fee_ordering() {
        let mut coin = bitcoin();
        coin.minfee_kb = Some(3_000_000);
        assert_eq!(
            validate_record(&coin),
            vec!["max fee must not be smaller than min fee".to_string()]
        );
    }

    #[test]
    fn test_byte_width_ranges() {
        let mut coin = bitcoin();
        coin.xpub_magic = Some(0x1_0000_0000);
        coin.fork_id = Some(256);
        coin.slip44 = Some(1 << 31);

        let errors = validate_record(&coin);
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("xpub_magic 0x100000000"));
        assert!(errors[1].starts_with("fork_id"));
        assert!(errors[2].starts_with("slip44"));
    }

    #[test]
    fn test_segwit_companions() {
        let mut coin = bitcoin();
        coin.bech32_prefix = None;
        assert_eq!(
            validate_record(&coin),
            vec!["bech32_prefix must be defined for segwit-enabled coin".to_string()]
        );

        let mut coin = bitcoin();
        coin.segwit = Some(false);
        let errors = validate_record(&coin);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.ends_with("segwit-disabled coin")));

        let mut coin = bitcoin();
        coin.segwit = None;
        coin.bech32_prefix = None;
        coin.xpub_magic_segwit_p2sh = None;
        coin.xpub_magic_segwit_native = None;
        assert!(validate_record(&coin).is_empty());
    }

    #[test]
    fn test_cashaddr_requires_fork_id() {
        let mut coin = bitcoin();
        coin.cashaddr_prefix = Some("bitcoincash".to_string());
        assert_eq!(
            validate_record(&coin),
            vec!["cashaddr_prefix requires fork_id to be defined".to_string()]
        );

        coin.fork_id = Some(0);
        assert!(validate_record(&coin).is_empty());
    }

    #[test]
    fn test_format_checks() {
        let mut coin = bitcoin();
        coin.hash_genesis_block = Some("00ff".to_string());
        coin.coin_shortcut = Some("btc".to_string());
        coin.uri_prefix = Some("Bitcoin".to_string());
        coin.website = Some("http://bitcoin.org".to_string());
        coin.github = Some("https://gitlab.com/bitcoin".to_string());
        coin.bitcore = vec!["ftp://insight.example.com".to_string()];
        coin.min_address_length = Some(40);
        coin.max_address_length = Some(30);

        assert_eq!(validate_record(&coin).len(), 7);
    }

    #[test]
    fn test_testnet_shortcut_allowed() {
        let mut coin = bitcoin();
        coin.coin_shortcut = Some("tBTC".to_string());
        assert!(validate_record(&coin).is_empty());
    }

    #[test]
    fn test_duplicate_keys() {
        let a = bitcoin();
        let b = bitcoin();
        let mut c = bitcoin();
        c.key = "bitcoin:LTC".to_string();
        let misc = vec![
            MiscCoin { key: "bitcoin:LTC".to_string(), name: "Litecoin".to_string() },
            MiscCoin { key: "misc:XRP".to_string(), name: "Ripple".to_string() },
        ];

        assert_eq!(
            find_duplicate_keys(&[a, b, c], &misc),
            vec!["bitcoin:BTC".to_string(), "bitcoin:LTC".to_string()]
        );
        assert!(find_duplicate_keys(&[bitcoin()], &[]).is_empty());
    }
}
