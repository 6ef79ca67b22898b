//! Signed coin definitions.
//!
//! A coin definition is a compact binary description of one coin that a
//! device can load without a firmware update:
//!
//! ```text
//! [64-byte Ed25519 signature][payload]
//! ```
//!
//! The payload is the protobuf encoding of the CoinDef field table (see
//! [`encoder::COINDEF_FIELDS`]) with the icon appended last. The signature
//! covers the SHA-256 digest of exactly the payload bytes.
//!
//! Icon handling and signing need the `coindefs` cargo feature; the payload
//! encoder is always available.

pub mod encoder;
#[cfg(feature = "coindefs")]
pub mod icon;
#[cfg(feature = "coindefs")]
pub mod signer;

pub use encoder::{
    encode_definition, encode_with_schema, EncodeError, FieldKind, FieldSpec, COINDEF_FIELDS,
};
#[cfg(feature = "coindefs")]
pub use icon::{decode_icon, encode_icon, IconError};
#[cfg(feature = "coindefs")]
pub use signer::{verify_definition, SignedDefinition, Signer, SignerError};

/// Compressed 32x32 RGB565 icon bitmap, raw deflate without zlib framing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedIcon(pub Vec<u8>);

impl EncodedIcon {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
