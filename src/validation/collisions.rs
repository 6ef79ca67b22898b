//! Address parameter collisions across coins.
//!
//! Collisions are warnings only. Testnets routinely share parameters with each
//! other, so a collision never fails a check on its own.

use crate::coin::CoinRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Fields monitored for collisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionField {
    Slip44,
    AddressType,
    AddressTypeP2sh,
}

impl CollisionField {
    pub const ALL: [CollisionField; 3] = [
        CollisionField::Slip44,
        CollisionField::AddressType,
        CollisionField::AddressTypeP2sh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionField::Slip44 => "slip44",
            CollisionField::AddressType => "address_type",
            CollisionField::AddressTypeP2sh => "address_type_p2sh",
        }
    }

    fn value(&self, coin: &CoinRecord) -> Option<u64> {
        match self {
            CollisionField::Slip44 => coin.slip44,
            CollisionField::AddressType => coin.address_type,
            CollisionField::AddressTypeP2sh => coin.address_type_p2sh,
        }
    }
}

impl fmt::Display for CollisionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colliding value -> coin keys sharing it, in registry order
pub type Collisions = BTreeMap<u64, Vec<String>>;

/// Collisions per monitored field. Every monitored field has an entry,
/// possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollisionReport {
    pub fields: BTreeMap<CollisionField, Collisions>,
}

impl CollisionReport {
    pub fn get(&self, field: CollisionField) -> Option<&Collisions> {
        self.fields.get(&field)
    }

    /// Number of colliding (field, value) groups
    pub fn len(&self) -> usize {
        self.fields.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One warning line per colliding value
    pub fn warnings(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (field, dups) in &self.fields {
            for (value, keys) in dups {
                lines.push(format!(
                    "collision in {}: {} : {}",
                    field,
                    value,
                    keys.join(", ")
                ));
            }
        }
        lines
    }
}

/// Group coin keys by each monitored field's value and keep groups with more
/// than one member
pub fn find_address_collisions(coins: &[CoinRecord]) -> CollisionReport {
    let mut report = CollisionReport::default();

    for field in CollisionField::ALL {
        let mut groups: Collisions = BTreeMap::new();
        for coin in coins {
            if let Some(value) = field.value(coin) {
                groups.entry(value).or_default().push(coin.key.clone());
            }
        }
        groups.retain(|_, keys| keys.len() > 1);
        report.fields.insert(field, groups);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(key: &str, slip44: u64, p2pkh: u64, p2sh: u64) -> CoinRecord {
        CoinRecord {
            key: key.to_string(),
            slip44: Some(slip44),
            address_type: Some(p2pkh),
            address_type_p2sh: Some(p2sh),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_collisions() {
        let coins = vec![coin("bitcoin:BTC", 0, 0, 5), coin("bitcoin:LTC", 2, 48, 50)];
        let report = find_address_collisions(&coins);

        assert!(report.is_empty());
        assert_eq!(report.fields.len(), 3);
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn test_collisions_keep_registry_order() {
        let coins = vec![
            coin("bitcoin:ZZZ", 1, 111, 196),
            coin("bitcoin:BTC", 0, 0, 5),
            coin("bitcoin:AAA", 1, 111, 58),
        ];
        let report = find_address_collisions(&coins);

        let slip44 = report.get(CollisionField::Slip44).unwrap();
        assert_eq!(
            slip44.get(&1).unwrap(),
            &vec!["bitcoin:ZZZ".to_string(), "bitcoin:AAA".to_string()]
        );

        let p2pkh = report.get(CollisionField::AddressType).unwrap();
        assert_eq!(
            p2pkh.get(&111).unwrap(),
            &vec!["bitcoin:ZZZ".to_string(), "bitcoin:AAA".to_string()]
        );

        assert!(report.get(CollisionField::AddressTypeP2sh).unwrap().is_empty());
        assert_eq!(report.len(), 2);
        assert_eq!(
            report.warnings(),
            vec![
                "collision in slip44: 1 : bitcoin:ZZZ, bitcoin:AAA".to_string(),
                "collision in address_type: 111 : bitcoin:ZZZ, bitcoin:AAA".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let mut a = coin("bitcoin:A", 1, 10, 11);
        let mut b = coin("bitcoin:B", 2, 12, 13);
        a.slip44 = None;
        b.slip44 = None;

        let report = find_address_collisions(&[a, b]);
        assert!(report.is_empty());
    }
}
