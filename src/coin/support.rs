//! Support status records.
//!
//! Support data arrives as loosely-typed JSON mappings. [`SupportFlags::parse`]
//! turns one mapping into typed flags, collecting every structural problem
//! instead of stopping at the first one.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Raw support mapping for one coin, as supplied by the registry loader
pub type SupportRecord = BTreeMap<String, serde_json::Value>;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid version regex"));

/// Support level of one hardware device for one coin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSupport {
    /// `false` in the registry
    Unsupported,
    /// `"soon"`
    Soon,
    /// First firmware version with support, e.g. `"1.6.2"`
    Version(String),
    /// Link to an external wallet that supports the coin
    Link(String),
}

impl DeviceSupport {
    fn parse(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(false) => Some(DeviceSupport::Unsupported),
            serde_json::Value::String(s) if s == "soon" => Some(DeviceSupport::Soon),
            serde_json::Value::String(s) if VERSION_RE.is_match(s) => {
                Some(DeviceSupport::Version(s.clone()))
            }
            serde_json::Value::String(s)
                if s.starts_with("https://") || s.starts_with("http://") =>
            {
                Some(DeviceSupport::Link(s.clone()))
            }
            _ => None,
        }
    }
}

impl Serialize for DeviceSupport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DeviceSupport::Unsupported => serializer.serialize_bool(false),
            DeviceSupport::Soon => serializer.serialize_str("soon"),
            DeviceSupport::Version(v) | DeviceSupport::Link(v) => serializer.serialize_str(v),
        }
    }
}

/// Typed support flags for one coin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupportFlags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webwallet: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trezor1: Option<DeviceSupport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trezor2: Option<DeviceSupport>,
    /// Entry deliberately refers to a coin outside the expected set
    #[serde(rename = "override", skip_serializing_if = "std::ops::Not::not")]
    pub is_override: bool,
}

impl SupportFlags {
    /// Parse a raw support mapping, returning every structural error found
    pub fn parse(record: &SupportRecord) -> Result<Self, Vec<String>> {
        let mut flags = SupportFlags::default();
        let mut errors = Vec::new();

        for (name, value) in record {
            match name.as_str() {
                "connect" | "webwallet" | "override" => match value.as_bool() {
                    Some(b) => match name.as_str() {
                        "connect" => flags.connect = Some(b),
                        "webwallet" => flags.webwallet = Some(b),
                        _ => flags.is_override = b,
                    },
                    None => errors.push(format!("invalid value for {}: {}", name, value)),
                },
                "trezor1" | "trezor2" => match DeviceSupport::parse(value) {
                    Some(support) if name == "trezor1" => flags.trezor1 = Some(support),
                    Some(support) => flags.trezor2 = Some(support),
                    None => errors.push(format!("invalid value for {}: {}", name, value)),
                },
                _ => errors.push(format!("unknown support key: {}", name)),
            }
        }

        if errors.is_empty() {
            Ok(flags)
        } else {
            Err(errors)
        }
    }
}
