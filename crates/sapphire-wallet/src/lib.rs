//! Sapphire Wallet - the wallet collaborator boundary
//!
//! Models the browser-extension wallet as a narrow async capability
//! (accounts + message signing) plus a session wrapper that tracks the
//! connected address the way the web client's wallet context does.
//! No concrete wallet library is depended on; providers are trait
//! implementations, and [`LocalSigner`] is a deterministic stand-in for
//! tests and the CLI.

pub mod provider;
pub mod session;
pub mod signer;

pub use provider::{Address, AddressRecord, WalletError, WalletProvider};
pub use session::{short_address, WalletSession};
pub use signer::LocalSigner;
