//! AES-256-GCM authenticated encryption
//!
//! 96-bit random nonces, 128-bit tags. Decryption fails closed: a wrong
//! key, a flipped bit, or a truncated field all surface as
//! `AuthenticationFailed` or `Encoding`, never as garbage plaintext.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::envelope::EncryptedEnvelope;
use crate::kdf::SymmetricKey;
use crate::{CryptoError, Result};

/// 256-bit key (32 bytes)
pub const KEY_SIZE: usize = 32;
/// 96-bit nonce (12 bytes)
pub const NONCE_SIZE: usize = 12;
/// 128-bit GCM authentication tag (16 bytes)
pub const TAG_SIZE: usize = 16;

/// Generate a cryptographically secure random nonce.
///
/// Always random, never derived from the key or plaintext - deriving it
/// would risk reuse, which breaks GCM confidentiality.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext` under `key` into a self-contained envelope.
///
/// Each call is independent and stateless; concurrent calls are not
/// serialized against each other.
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey) -> Result<EncryptedEnvelope> {
    if plaintext.is_empty() {
        return Err(CryptoError::EmptyInput);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::Encryption)?;

    let nonce_bytes = generate_nonce();
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::Encryption)?;

    tracing::debug!(ciphertext_len = ciphertext.len(), "sealed payload");

    Ok(EncryptedEnvelope::new(&ciphertext, &nonce_bytes))
}

/// Decrypt an envelope, verifying its authentication tag.
///
/// Fails with `AuthenticationFailed` on any tag mismatch. A failed
/// verification is not transient; there is nothing to retry.
pub fn decrypt(envelope: &EncryptedEnvelope, key: &SymmetricKey) -> Result<Zeroizing<Vec<u8>>> {
    let (ciphertext, nonce_bytes) = envelope.decode()?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| CryptoError::AuthenticationFailed)?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, ciphertext.as_slice())
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    Ok(Zeroizing::new(plaintext))
}

/// Decrypt an envelope whose plaintext is expected to be UTF-8 text.
pub fn decrypt_string(envelope: &EncryptedEnvelope, key: &SymmetricKey) -> Result<Zeroizing<String>> {
    let plaintext = decrypt(envelope, key)?;
    let text = std::str::from_utf8(&plaintext)
        .map_err(|_| CryptoError::Encoding("plaintext is not valid UTF-8".to_string()))?;
    Ok(Zeroizing::new(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::derive_key_from_password;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = derive_key_from_password("correct horse").unwrap();
        let plaintext = br#"{"address":"0xabc","network":"sapphire"}"#;

        let envelope = encrypt(plaintext, &key).unwrap();
        assert!(!envelope.data.is_empty());
        assert!(!envelope.iv.is_empty());

        let decrypted = decrypt(&envelope, &key).unwrap();
        assert_eq!(decrypted.as_slice(), plaintext);
    }

    #[test]
    fn test_wrong_key_fails_closed() {
        let key = derive_key_from_password("correct horse").unwrap();
        let wrong = derive_key_from_password("wrong horse").unwrap();

        let envelope = encrypt(b"secret data", &key).unwrap();
        assert!(matches!(
            decrypt(&envelope, &wrong),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_empty_plaintext_rejected() {
        let key = derive_key_from_password("pw").unwrap();
        assert!(matches!(
            encrypt(b"", &key),
            Err(CryptoError::EmptyInput)
        ));
    }

    #[test]
    fn test_nonce_uniqueness() {
        let key = derive_key_from_password("pw").unwrap();

        let a = encrypt(b"same plaintext", &key).unwrap();
        let b = encrypt(b"same plaintext", &key).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.data, b.data);
    }

    #[test]
    fn test_decrypt_string_roundtrip() {
        let key = derive_key_from_password("pw").unwrap();
        let envelope = encrypt("héllo wörld".as_bytes(), &key).unwrap();

        let text = decrypt_string(&envelope, &key).unwrap();
        assert_eq!(text.as_str(), "héllo wörld");
    }
}
