//! Definition signing.
//!
//! The signature is Ed25519 over the SHA-256 digest of the payload. The
//! built-in placeholder key is for development only; real signing keys are
//! loaded from a key file supplied by the deploying system.

use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier, VerifyingKey, SIGNATURE_LENGTH};
use log::warn;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Seed of the development placeholder key
const PLACEHOLDER_SEED: [u8; 32] = [b'A'; 32];

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("signing key must be 32 bytes of hex: {0}")]
    InvalidKey(String),

    #[error("failed to read signing key {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("definition too short to carry a signature ({0} bytes)")]
    Truncated(usize),

    #[error("signature verification failed: {0}")]
    Verification(#[from] ed25519_dalek::SignatureError),
}

/// SHA-256 of the payload
pub fn digest(payload: &[u8]) -> [u8; 32] {
    Sha256::digest(payload).into()
}

pub struct Signer {
    key: SigningKey,
}

impl Signer {
    /// Development key. Logs a warning every time it is constructed.
    pub fn placeholder() -> Self {
        warn!(
            "Signing with the built-in placeholder key; \
             definitions will not be accepted by production devices"
        );
        Self { key: SigningKey::from_bytes(&PLACEHOLDER_SEED) }
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self { key: SigningKey::from_bytes(seed) }
    }

    /// Parse a 32-byte seed from hex, surrounding whitespace ignored
    pub fn from_seed_hex(seed_hex: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(seed_hex.trim())
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        let seed: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SignerError::InvalidKey(format!("got {} bytes", bytes.len())))?;
        Ok(Self::from_seed(&seed))
    }

    /// Load a hex seed from a file provided by the key-management boundary
    pub fn from_key_file(path: &Path) -> Result<Self, SignerError> {
        let content = fs::read_to_string(path).map_err(|source| SignerError::KeyFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_seed_hex(&content)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Sign the digest of `payload`
    pub fn sign(&self, payload: &[u8]) -> Signature {
        self.key.sign(&digest(payload))
    }

    pub fn sign_definition(&self, payload: Vec<u8>) -> SignedDefinition {
        let signature = self.sign(&payload);
        SignedDefinition { signature, payload }
    }
}

/// `signature ‖ payload`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDefinition {
    pub signature: Signature,
    pub payload: Vec<u8>,
}

impl SignedDefinition {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SIGNATURE_LENGTH + self.payload.len());
        out.extend_from_slice(&self.signature.to_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    /// Lowercase hex of the full definition, as stored in `coindefs.json`
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Split a definition and verify its signature, returning the payload
pub fn verify_definition<'a>(
    definition: &'a [u8],
    key: &VerifyingKey,
) -> Result<&'a [u8], SignerError> {
    if definition.len() < SIGNATURE_LENGTH {
        return Err(SignerError::Truncated(definition.len()));
    }
    let (sig_bytes, payload) = definition.split_at(SIGNATURE_LENGTH);
    let signature = Signature::from_slice(sig_bytes)?;
    key.verify(&digest(payload), &signature)?;
    Ok(payload)
}
