//! Wallet provider interface
//!
//! The narrow boundary to a browser-extension wallet: expose accounts,
//! sign messages, notify on account changes. Prompt ordering for
//! concurrent requests is the provider's concern, not ours.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Stable identifier of a wallet account
pub type Address = String;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("user rejected the request")]
    Rejected,

    #[error("wallet transport error: {0}")]
    Transport(String),

    #[error("wallet is not connected")]
    NotConnected,

    #[error("wallet reported no accounts")]
    NoAccounts,
}

/// The payload this application seals: the connected account's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub address: Address,
    pub network: String,
}

impl AddressRecord {
    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
            network: "sapphire".to_string(),
        }
    }
}

/// Async boundary to a wallet.
///
/// Every method that may prompt the user is a suspension point; callers
/// resume when the user acts. A declined prompt surfaces as
/// [`WalletError::Rejected`] promptly - providers must not hang on
/// abandoned prompts.
#[allow(async_fn_in_trait)]
pub trait WalletProvider: Send + Sync {
    /// Prompt the user to expose their accounts (connect flow).
    /// The first entry is the active account.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Accounts already exposed without prompting; empty when locked.
    async fn accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Sign `message` with the active account. May prompt the user.
    async fn sign_message(&self, message: &str) -> Result<String, WalletError>;

    /// Active-address change notifications; `None` means disconnected.
    fn subscribe_accounts(&self) -> watch::Receiver<Option<Address>>;
}
