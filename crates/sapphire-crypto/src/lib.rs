//! Sapphire Crypto - wallet-bound envelope encryption
//!
//! This crate provides:
//! - Key derivation from a user password (PBKDF2-HMAC-SHA256)
//! - Key derivation from a wallet signature over a retained message
//! - AES-256-GCM authenticated encryption into a text-safe envelope
//!
//! Keys live only for the duration of one call. No plaintext, password,
//! or key material is ever logged.

pub mod cipher;
pub mod envelope;
pub mod kdf;

pub use cipher::{decrypt, decrypt_string, encrypt, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use envelope::{EncryptedEnvelope, FORMAT_VERSION};
pub use kdf::{
    derive_key_from_password, derive_key_from_password_with_salt, derive_key_from_signature,
    derive_key_from_signature_over, MessageSigner, SignerError, SymmetricKey,
};

/// Errors that can occur in cryptographic operations
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("input must not be empty")]
    EmptyInput,

    #[error("signer rejected the request")]
    SignerRejected,

    #[error("signer error: {0}")]
    Signer(String),

    #[error("encryption failed")]
    Encryption,

    #[error("authentication failed - wrong key or tampered data")]
    AuthenticationFailed,

    #[error("malformed envelope: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
