//! Coin definition payload encoding.
//!
//! Fields are written as protobuf wire-format entries, in the order of the
//! field table, followed by the icon. Absent scalar fields are omitted; absent
//! repeated fields are treated as empty sequences and emit nothing.

use super::EncodedIcon;
use crate::coin::{CoinRecord, FieldValue};
use prost::encoding::{encode_key, encode_varint, WireType};

/// How a record field is coerced onto the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Unsigned varint
    Uint,
    /// Varint 0/1
    Bool,
    /// UTF-8 string, length-delimited
    Str,
    /// String field encoded as its raw UTF-8 bytes
    Utf8Bytes,
    /// Hex string decoded to raw bytes
    HexBytes,
}

/// One entry of a definition field table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub tag: u32,
    pub name: &'static str,
    pub kind: FieldKind,
    pub repeated: bool,
}

const fn field(tag: u32, name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { tag, name, kind, repeated: false }
}

const fn repeated(tag: u32, name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { tag, name, kind, repeated: true }
}

/// Tag of the icon field, always written after the table fields
pub const ICON_TAG: u32 = 26;

/// CoinDef field table. Order is part of the wire contract.
pub const COINDEF_FIELDS: &[FieldSpec] = &[
    field(1, "coin_name", FieldKind::Str),
    field(2, "coin_shortcut", FieldKind::Str),
    field(3, "coin_label", FieldKind::Str),
    field(4, "curve_name", FieldKind::Str),
    field(5, "address_type", FieldKind::Uint),
    field(6, "address_type_p2sh", FieldKind::Uint),
    field(7, "maxfee_kb", FieldKind::Uint),
    field(8, "minfee_kb", FieldKind::Uint),
    field(9, "signed_message_header", FieldKind::Utf8Bytes),
    field(10, "hash_genesis_block", FieldKind::HexBytes),
    field(11, "xprv_magic", FieldKind::Uint),
    field(12, "xpub_magic", FieldKind::Uint),
    field(13, "xpub_magic_segwit_p2sh", FieldKind::Uint),
    field(14, "xpub_magic_segwit_native", FieldKind::Uint),
    field(15, "bech32_prefix", FieldKind::Str),
    field(16, "cashaddr_prefix", FieldKind::Str),
    field(17, "slip44", FieldKind::Uint),
    field(18, "segwit", FieldKind::Bool),
    field(19, "decred", FieldKind::Bool),
    field(20, "fork_id", FieldKind::Uint),
    field(21, "force_bip143", FieldKind::Bool),
    field(22, "dust_limit", FieldKind::Uint),
    field(23, "uri_prefix", FieldKind::Str),
    field(24, "min_address_length", FieldKind::Uint),
    field(25, "max_address_length", FieldKind::Uint),
    field(28, "website", FieldKind::Str),
    field(29, "github", FieldKind::Str),
    field(30, "maintainer", FieldKind::Str),
    field(31, "blocktime_seconds", FieldKind::Uint),
    field(32, "bip115", FieldKind::Bool),
    field(33, "cooldown", FieldKind::Uint),
    repeated(34, "blockbook", FieldKind::Str),
    repeated(35, "bitcore", FieldKind::Str),
];

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("field {field}: invalid hex: {source}")]
    InvalidHex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("field {field}: record value does not match declared kind {kind:?}")]
    KindMismatch { field: &'static str, kind: FieldKind },
}

/// Encode a coin record with the CoinDef field table
pub fn encode_definition(coin: &CoinRecord, icon: &EncodedIcon) -> Result<Vec<u8>, EncodeError> {
    encode_with_schema(COINDEF_FIELDS, coin, icon)
}

/// Encode a coin record with an arbitrary field table, icon last
pub fn encode_with_schema(
    schema: &[FieldSpec],
    coin: &CoinRecord,
    icon: &EncodedIcon,
) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::with_capacity(256 + icon.len());

    for spec in schema {
        match (coin.field(spec.name), spec.repeated) {
            (None, _) => {}
            (Some(FieldValue::Strings(items)), true) => {
                for item in items {
                    encode_scalar(spec, &FieldValue::Str(item), &mut buf)?;
                }
            }
            (Some(FieldValue::Strings(_)), false) | (Some(_), true) => {
                return Err(EncodeError::KindMismatch { field: spec.name, kind: spec.kind });
            }
            (Some(value), false) => encode_scalar(spec, &value, &mut buf)?,
        }
    }

    encode_bytes(ICON_TAG, icon.as_bytes(), &mut buf);
    Ok(buf)
}

fn encode_scalar(
    spec: &FieldSpec,
    value: &FieldValue<'_>,
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    match (spec.kind, value) {
        (FieldKind::Uint, FieldValue::Uint(v)) => encode_uint(spec.tag, *v, buf),
        (FieldKind::Bool, FieldValue::Bool(v)) => encode_uint(spec.tag, u64::from(*v), buf),
        (FieldKind::Str | FieldKind::Utf8Bytes, FieldValue::Str(s)) => {
            encode_bytes(spec.tag, s.as_bytes(), buf)
        }
        (FieldKind::HexBytes, FieldValue::Str(s)) => {
            let raw = hex::decode(s)
                .map_err(|source| EncodeError::InvalidHex { field: spec.name, source })?;
            encode_bytes(spec.tag, &raw, buf)
        }
        _ => return Err(EncodeError::KindMismatch { field: spec.name, kind: spec.kind }),
    }
    Ok(())
}

fn encode_uint(tag: u32, value: u64, buf: &mut Vec<u8>) {
    encode_key(tag, WireType::Varint, buf);
    encode_varint(value, buf);
}

fn encode_bytes(tag: u32, value: &[u8], buf: &mut Vec<u8>) {
    encode_key(tag, WireType::LengthDelimited, buf);
    encode_varint(value.len() as u64, buf);
    buf.extend_from_slice(value);
}
