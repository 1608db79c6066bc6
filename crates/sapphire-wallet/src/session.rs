//! Wallet session lifecycle
//!
//! Tracks the connected address and the last signature the way the web
//! client's wallet context does: connect prompts for accounts,
//! disconnect clears everything, and an account change invalidates any
//! cached signature.

use sapphire_crypto::SignerError;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::provider::{Address, WalletError, WalletProvider};

pub struct WalletSession<P: WalletProvider> {
    provider: P,
    accounts_rx: watch::Receiver<Option<Address>>,
    address: Option<Address>,
    last_signature: Option<String>,
}

impl<P: WalletProvider> WalletSession<P> {
    pub fn new(provider: P) -> Self {
        let accounts_rx = provider.subscribe_accounts();
        Self {
            provider,
            accounts_rx,
            address: None,
            last_signature: None,
        }
    }

    /// Restore an existing connection without prompting (the
    /// page-refresh path). Returns whether an account was found.
    pub async fn try_restore(&mut self) -> Result<bool, WalletError> {
        let accounts = self.provider.accounts().await?;
        if let Some(first) = accounts.into_iter().next() {
            debug!(address = %short_address(&first), "restored wallet connection");
            self.address = Some(first);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Prompt the user to connect. The first exposed account becomes
    /// the active one.
    pub async fn connect(&mut self) -> Result<Address, WalletError> {
        let accounts = self.provider.request_accounts().await?;
        let address = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;
        info!(address = %short_address(&address), "wallet connected");
        self.address = Some(address.clone());
        Ok(address)
    }

    pub fn disconnect(&mut self) {
        info!("wallet disconnected");
        self.address = None;
        self.last_signature = None;
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn last_signature(&self) -> Option<&str> {
        self.last_signature.as_deref()
    }

    /// Sign a message with the connected account, caching the result.
    pub async fn sign_message(&mut self, message: &str) -> Result<String, WalletError> {
        if self.address.is_none() {
            return Err(WalletError::NotConnected);
        }
        let signature = self.provider.sign_message(message).await?;
        self.last_signature = Some(signature.clone());
        Ok(signature)
    }

    /// Apply an account-change notification from the provider. A switch
    /// or disconnect invalidates any cached signature.
    pub fn handle_accounts_changed(&mut self, active: Option<Address>) {
        match &active {
            Some(address) => debug!(address = %short_address(address), "active account changed"),
            None => debug!("wallet reported no active account"),
        }
        self.address = active;
        self.last_signature = None;
    }

    /// Pull the latest account state from the provider's notification
    /// stream, if it changed since the last call.
    pub fn poll_accounts_changed(&mut self) {
        if self.accounts_rx.has_changed().unwrap_or(false) {
            let active = self.accounts_rx.borrow_and_update().clone();
            self.handle_accounts_changed(active);
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// Key derivation signs through the session, so a disconnected wallet
/// surfaces before any prompt. Signatures obtained here are not cached;
/// keys must not outlive the call that derived them.
impl<P: WalletProvider> sapphire_crypto::MessageSigner for WalletSession<P> {
    async fn address(&self) -> Result<String, SignerError> {
        self.address
            .clone()
            .ok_or_else(|| SignerError::Transport("wallet is not connected".to_string()))
    }

    async fn sign_message(&self, message: &str) -> Result<String, SignerError> {
        if self.address.is_none() {
            return Err(SignerError::Transport(
                "wallet is not connected".to_string(),
            ));
        }
        self.provider
            .sign_message(message)
            .await
            .map_err(|err| match err {
                WalletError::Rejected => SignerError::Rejected,
                other => SignerError::Transport(other.to_string()),
            })
    }
}

/// `0x12ab...cd34` display form used everywhere an address is shown.
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        address.to_string()
    } else {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    }
}
