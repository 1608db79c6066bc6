//! End-to-end properties of the KDF + encryption engine.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sapphire_crypto::{
    decrypt, decrypt_string, derive_key_from_password, derive_key_from_signature,
    derive_key_from_signature_over, encrypt, CryptoError, EncryptedEnvelope, MessageSigner,
    SignerError,
};
use sha2::{Digest, Sha256};

const ADDRESS_RECORD: &str = r#"{"address":"0xabc1234567890defabc1234567890defabc12345","network":"sapphire"}"#;

/// Deterministic signer double: signature = sha256(secret || message).
struct FixedSigner {
    address: String,
    secret: Vec<u8>,
}

impl MessageSigner for FixedSigner {
    async fn address(&self) -> Result<String, SignerError> {
        Ok(self.address.clone())
    }

    async fn sign_message(&self, message: &str) -> Result<String, SignerError> {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(message.as_bytes());
        Ok(hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect())
    }
}

#[test]
fn password_roundtrip_concrete_scenario() {
    let key = derive_key_from_password("correct horse").unwrap();
    let envelope = encrypt(ADDRESS_RECORD.as_bytes(), &key).unwrap();

    assert!(!envelope.data.is_empty());
    assert!(!envelope.iv.is_empty());

    let key_again = derive_key_from_password("correct horse").unwrap();
    let plaintext = decrypt_string(&envelope, &key_again).unwrap();
    assert_eq!(plaintext.as_str(), ADDRESS_RECORD);

    let wrong = derive_key_from_password("wrong horse").unwrap();
    assert!(matches!(
        decrypt(&envelope, &wrong),
        Err(CryptoError::AuthenticationFailed)
    ));
}

#[tokio::test]
async fn signature_roundtrip_via_retained_message() {
    let signer = FixedSigner {
        address: "0xabc1234567890defabc1234567890defabc12345".to_string(),
        secret: b"wallet-account-key".to_vec(),
    };

    let (key, message) = derive_key_from_signature(&signer).await.unwrap();
    let envelope = encrypt(ADDRESS_RECORD.as_bytes(), &key)
        .unwrap()
        .with_sign_message(&message);

    // A consumer holds only the serialized envelope and the signer
    let stored = envelope.to_json().unwrap();
    let restored = EncryptedEnvelope::from_json(&stored).unwrap();
    let retained = restored.sign_message.clone().unwrap();

    let key_again = derive_key_from_signature_over(&signer, &retained)
        .await
        .unwrap();
    let plaintext = decrypt_string(&restored, &key_again).unwrap();
    assert_eq!(plaintext.as_str(), ADDRESS_RECORD);
}

#[tokio::test]
async fn different_derivation_message_fails_authentication() {
    let signer = FixedSigner {
        address: "0xabc".to_string(),
        secret: b"wallet-account-key".to_vec(),
    };

    let (key, _message) = derive_key_from_signature(&signer).await.unwrap();
    let envelope = encrypt(ADDRESS_RECORD.as_bytes(), &key).unwrap();

    let other_key = derive_key_from_signature_over(&signer, "some other message")
        .await
        .unwrap();
    assert!(matches!(
        decrypt(&envelope, &other_key),
        Err(CryptoError::AuthenticationFailed)
    ));
}

#[test]
fn single_bit_flips_in_data_are_detected() {
    let key = derive_key_from_password("correct horse").unwrap();
    let envelope = encrypt(ADDRESS_RECORD.as_bytes(), &key).unwrap();

    let ciphertext = BASE64.decode(&envelope.data).unwrap();
    for i in 0..ciphertext.len() {
        let mut tampered_bytes = ciphertext.clone();
        tampered_bytes[i] ^= 0x01;

        let mut tampered = envelope.clone();
        tampered.data = BASE64.encode(&tampered_bytes);

        assert!(
            matches!(decrypt(&tampered, &key), Err(CryptoError::AuthenticationFailed)),
            "bit flip in data byte {i} was not detected"
        );
    }
}

#[test]
fn single_bit_flips_in_iv_are_detected() {
    let key = derive_key_from_password("correct horse").unwrap();
    let envelope = encrypt(ADDRESS_RECORD.as_bytes(), &key).unwrap();

    let iv = BASE64.decode(&envelope.iv).unwrap();
    for i in 0..iv.len() {
        let mut tampered_bytes = iv.clone();
        tampered_bytes[i] ^= 0x01;

        let mut tampered = envelope.clone();
        tampered.iv = BASE64.encode(&tampered_bytes);

        assert!(
            matches!(decrypt(&tampered, &key), Err(CryptoError::AuthenticationFailed)),
            "bit flip in iv byte {i} was not detected"
        );
    }
}

#[test]
fn corrupted_base64_text_is_an_encoding_error() {
    let key = derive_key_from_password("pw").unwrap();
    let mut envelope = encrypt(b"payload", &key).unwrap();
    envelope.data = format!("!{}", envelope.data);

    assert!(matches!(
        decrypt(&envelope, &key),
        Err(CryptoError::Encoding(_))
    ));
}

#[test]
fn error_variants_are_distinct_for_callers() {
    // Wrong password vs malformed data vs declined signer must not collapse
    let key = derive_key_from_password("right").unwrap();
    let wrong = derive_key_from_password("wrong").unwrap();
    let envelope = encrypt(b"payload", &key).unwrap();

    let auth = decrypt(&envelope, &wrong).unwrap_err();
    assert!(matches!(auth, CryptoError::AuthenticationFailed));

    let mut garbled = envelope.clone();
    garbled.iv = "%%%".to_string();
    let encoding = decrypt(&garbled, &key).unwrap_err();
    assert!(matches!(encoding, CryptoError::Encoding(_)));

    let empty = derive_key_from_password("").unwrap_err();
    assert!(matches!(empty, CryptoError::EmptyInput));
}
