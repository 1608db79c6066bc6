//! Key derivation - password and wallet-signature variants
//!
//! Both paths end in the same place: 32 bytes of key material for
//! AES-256-GCM. The password path is a PBKDF2 stretch with a fixed
//! application salt; the signature path hashes a wallet signature over
//! a message the caller must retain for later re-derivation.

use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::cipher::KEY_SIZE;
use crate::{CryptoError, Result};

/// Fixed application salt for the password KDF.
///
/// Deliberately not per-user: the scheme protects one user's value at
/// rest, not multi-tenant isolation. Callers that need per-user salting
/// can pass their own salt to [`derive_key_from_password_with_salt`].
pub const PASSWORD_SALT: &[u8] = b"sapphire-network-salt";

/// PBKDF2 work factor
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// A 256-bit symmetric key, scrubbed from memory on drop.
///
/// Only the KDF functions construct one. It is never serialized and
/// should not be cached: in the signature variant the caller cannot
/// recreate it without going back to the signer anyway.
pub struct SymmetricKey(Zeroizing<[u8; KEY_SIZE]>);

impl SymmetricKey {
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Outcome of asking an external signer for a signature
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("user rejected the signing request")]
    Rejected,

    #[error("signer transport error: {0}")]
    Transport(String),
}

/// Capability to sign arbitrary messages on behalf of a wallet account.
///
/// Contract: implementations MUST be deterministic per (account, message).
/// Re-signing the same message with the same account has to reproduce a
/// signature that hashes to the same key, or envelopes sealed with a
/// signature-derived key can never be opened again. Wallets that use
/// randomized signature schemes must not implement this trait; they would
/// need to persist the derived key instead.
#[allow(async_fn_in_trait)]
pub trait MessageSigner: Send + Sync {
    /// Stable identifier of the signing account.
    async fn address(&self) -> std::result::Result<String, SignerError>;

    /// Sign `message`. May prompt the user; a declined prompt surfaces
    /// as [`SignerError::Rejected`], never as a silent fallback.
    async fn sign_message(&self, message: &str) -> std::result::Result<String, SignerError>;
}

/// Derive a key from a user password using the fixed application salt.
///
/// Deterministic: the same password yields a bit-identical key on any
/// platform, indefinitely.
pub fn derive_key_from_password(password: &str) -> Result<SymmetricKey> {
    derive_key_from_password_with_salt(password, PASSWORD_SALT)
}

/// Same as [`derive_key_from_password`] but with a caller-chosen salt.
pub fn derive_key_from_password_with_salt(password: &str, salt: &[u8]) -> Result<SymmetricKey> {
    if password.is_empty() {
        return Err(CryptoError::EmptyInput);
    }

    tracing::debug!(rounds = PBKDF2_ROUNDS, "deriving key from password");

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, key.as_mut());
    Ok(SymmetricKey(key))
}

/// Derive a fresh key from a wallet signature.
///
/// Builds a new derivation message (including a timestamp so repeated
/// encryptions never reuse a signing prompt), asks the signer for a
/// signature over it, and hashes the signature down to 32 bytes.
///
/// Returns the message alongside the key. The caller must retain it -
/// it goes into the envelope - because decryption requires re-signing
/// that exact message.
pub async fn derive_key_from_signature<S: MessageSigner>(
    signer: &S,
) -> Result<(SymmetricKey, String)> {
    let address = signer.address().await.map_err(signer_error)?;
    let message = derivation_message(&address, Utc::now().timestamp_millis());
    let key = derive_key_from_signature_over(signer, &message).await?;
    Ok((key, message))
}

/// Re-derive the key for an existing envelope by re-signing its
/// retained message.
pub async fn derive_key_from_signature_over<S: MessageSigner>(
    signer: &S,
    message: &str,
) -> Result<SymmetricKey> {
    tracing::debug!("requesting wallet signature for key derivation");

    let signature = signer
        .sign_message(message)
        .await
        .map_err(signer_error)?;

    let digest = Sha256::digest(signature.as_bytes());
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    key.copy_from_slice(&digest[..KEY_SIZE]);
    Ok(SymmetricKey(key))
}

fn signer_error(err: SignerError) -> CryptoError {
    match err {
        SignerError::Rejected => CryptoError::SignerRejected,
        SignerError::Transport(msg) => CryptoError::Signer(msg),
    }
}

fn derivation_message(address: &str, issued_at_ms: i64) -> String {
    format!("sapphire key derivation v1\naddress: {address}\nissued-at: {issued_at_ms}")
}
