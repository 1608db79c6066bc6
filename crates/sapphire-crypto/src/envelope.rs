//! Envelope wire format
//!
//! Matches the stored shape used by the web client: base64 `data`
//! (ciphertext with the GCM tag appended) and `iv` (12-byte nonce),
//! plus the retained signing message for signature-derived keys.
//! `formatVersion` was absent in early envelopes, so it defaults to 1
//! when the field is missing.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::cipher::{NONCE_SIZE, TAG_SIZE};
use crate::{CryptoError, Result};

/// Current envelope format version
pub const FORMAT_VERSION: u8 = 1;

/// The persisted result of one encryption. Immutable after creation;
/// self-contained for decryption given the key (plus the retained
/// `sign_message` in the signature variant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    /// Version of the envelope format
    #[serde(default = "default_version")]
    pub format_version: u8,

    /// base64 ciphertext with the authentication tag appended
    pub data: String,

    /// base64 96-bit nonce
    pub iv: String,

    /// The exact message that was signed to derive the key. Not secret,
    /// but integrity-critical: a different message yields a different key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_message: Option<String>,
}

fn default_version() -> u8 {
    FORMAT_VERSION
}

impl EncryptedEnvelope {
    /// Create an envelope from raw ciphertext and nonce (encryption
    /// happens in cipher.rs).
    pub fn new(ciphertext: &[u8], nonce: &[u8; NONCE_SIZE]) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            data: BASE64.encode(ciphertext),
            iv: BASE64.encode(nonce),
            sign_message: None,
        }
    }

    /// Attach the key-derivation message (signature variant).
    pub fn with_sign_message(mut self, message: impl Into<String>) -> Self {
        self.sign_message = Some(message.into());
        self
    }

    /// Decode and validate the binary fields.
    pub(crate) fn decode(&self) -> Result<(Vec<u8>, [u8; NONCE_SIZE])> {
        let ciphertext = BASE64
            .decode(&self.data)
            .map_err(|e| CryptoError::Encoding(format!("data: {e}")))?;
        if ciphertext.len() < TAG_SIZE {
            return Err(CryptoError::Encoding(
                "data shorter than the authentication tag".to_string(),
            ));
        }

        let iv = BASE64
            .decode(&self.iv)
            .map_err(|e| CryptoError::Encoding(format!("iv: {e}")))?;
        let nonce: [u8; NONCE_SIZE] = iv.as_slice().try_into().map_err(|_| {
            CryptoError::Encoding(format!("iv must be {NONCE_SIZE} bytes, got {}", iv.len()))
        })?;

        Ok((ciphertext, nonce))
    }

    /// Serialize for clipboard/display.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CryptoError::Encoding(e.to_string()))
    }

    /// Parse a stored envelope.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CryptoError::Encoding(e.to_string()))
    }
}
