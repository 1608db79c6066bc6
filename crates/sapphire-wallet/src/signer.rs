//! Deterministic local signer
//!
//! Stands in for a browser wallet in tests and the CLI. Signatures are
//! SHA-256 over a keyed, domain-separated input, so re-signing the same
//! message always reproduces the same signature - the property that
//! signature-derived encryption keys depend on.

use sha2::{Digest, Sha256};
use tokio::sync::watch;
use zeroize::Zeroizing;

use sapphire_crypto::{MessageSigner, SignerError};

use crate::provider::{Address, WalletError, WalletProvider};

const SIGNATURE_DOMAIN: &[u8] = b"sapphire-local-signer-v1";
const ADDRESS_DOMAIN: &[u8] = b"sapphire-local-address-v1";

pub struct LocalSigner {
    address: Address,
    secret: Zeroizing<Vec<u8>>,
    accounts_tx: watch::Sender<Option<Address>>,
}

impl LocalSigner {
    pub fn new(address: impl Into<Address>, secret: impl Into<Vec<u8>>) -> Self {
        let address = address.into();
        let (accounts_tx, _) = watch::channel(Some(address.clone()));
        Self {
            address,
            secret: Zeroizing::new(secret.into()),
            accounts_tx,
        }
    }

    /// Build a signer whose address is derived from the secret, for
    /// callers that only hold a secret.
    pub fn from_secret(secret: impl Into<Vec<u8>>) -> Self {
        let secret = secret.into();
        let mut hasher = Sha256::new();
        hasher.update(ADDRESS_DOMAIN);
        hasher.update(&secret);
        let digest = hasher.finalize();
        let address = format!("0x{}", hex_encode(&digest[..20]));
        Self::new(address, secret)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    fn sign(&self, message: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(SIGNATURE_DOMAIN);
        hasher.update(&*self.secret);
        hasher.update([0u8]);
        hasher.update(message.as_bytes());
        hex_encode(&hasher.finalize())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl WalletProvider for LocalSigner {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.address.clone()])
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.address.clone()])
    }

    async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        Ok(self.sign(message))
    }

    fn subscribe_accounts(&self) -> watch::Receiver<Option<Address>> {
        self.accounts_tx.subscribe()
    }
}

impl MessageSigner for LocalSigner {
    async fn address(&self) -> Result<String, SignerError> {
        Ok(self.address.clone())
    }

    async fn sign_message(&self, message: &str) -> Result<String, SignerError> {
        Ok(self.sign(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_is_deterministic() {
        let signer = LocalSigner::new("0xabc", b"secret".to_vec());
        assert_eq!(signer.sign("message"), signer.sign("message"));
        assert_ne!(signer.sign("message"), signer.sign("other"));
    }

    #[test]
    fn test_different_secrets_different_signatures() {
        let a = LocalSigner::new("0xabc", b"secret-a".to_vec());
        let b = LocalSigner::new("0xabc", b"secret-b".to_vec());
        assert_ne!(a.sign("message"), b.sign("message"));
    }

    #[test]
    fn test_address_from_secret_is_stable() {
        let a = LocalSigner::from_secret(b"secret".to_vec());
        let b = LocalSigner::from_secret(b"secret".to_vec());
        assert_eq!(a.address(), b.address());
        assert!(a.address().starts_with("0x"));
        assert_eq!(a.address().len(), 2 + 40);
    }
}
