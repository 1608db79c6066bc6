//! sapphire - wallet-bound envelope encryption
//!
//! Usage:
//!   sapphire encrypt  - seal a payload under a password-derived key
//!   sapphire decrypt  - open a password-sealed envelope
//!   sapphire seal     - seal the account's address record under a signature-derived key
//!   sapphire open     - re-sign the retained message and open the envelope
//!   sapphire address  - show the dev signer's account address

use std::io::Read;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sapphire_crypto::{
    decrypt_string, derive_key_from_password, derive_key_from_signature,
    derive_key_from_signature_over, encrypt, EncryptedEnvelope,
};
use sapphire_wallet::{short_address, AddressRecord, LocalSigner, WalletSession};

#[derive(Parser)]
#[command(name = "sapphire")]
#[command(version)]
#[command(about = "Wallet-bound envelope encryption", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seal a payload under a password-derived key
    Encrypt {
        /// Password to derive the key from
        #[arg(long)]
        password: String,

        /// Payload to seal
        #[arg(long)]
        plaintext: String,
    },

    /// Open a password-sealed envelope
    Decrypt {
        /// Password used when sealing
        #[arg(long)]
        password: String,

        /// Envelope JSON, or '-' to read it from stdin
        #[arg(long)]
        envelope: String,
    },

    /// Seal the account's address record under a signature-derived key
    Seal {
        /// Secret backing the local dev signer
        #[arg(long)]
        secret: String,

        /// Payload to seal; defaults to the account's address record
        #[arg(long)]
        plaintext: Option<String>,
    },

    /// Re-sign the envelope's retained message and open it
    Open {
        /// Secret backing the local dev signer
        #[arg(long)]
        secret: String,

        /// Envelope JSON, or '-' to read it from stdin
        #[arg(long)]
        envelope: String,
    },

    /// Show the dev signer's account address
    Address {
        /// Secret backing the local dev signer
        #[arg(long)]
        secret: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encrypt {
            password,
            plaintext,
        } => {
            let key = derive_key_from_password(&password)?;
            let envelope = encrypt(plaintext.as_bytes(), &key)?;
            println!("{}", envelope.to_json()?);
        }

        Commands::Decrypt { password, envelope } => {
            let envelope = read_envelope(&envelope)?;
            let key = derive_key_from_password(&password)?;
            let plaintext = decrypt_string(&envelope, &key)?;
            println!("{}", plaintext.as_str());
        }

        Commands::Seal { secret, plaintext } => {
            let mut session = WalletSession::new(LocalSigner::from_secret(secret.into_bytes()));
            let address = session.connect().await?;

            let payload = match plaintext {
                Some(text) => text,
                None => serde_json::to_string(&AddressRecord::new(address))?,
            };

            let (key, message) = derive_key_from_signature(&session).await?;
            let envelope = encrypt(payload.as_bytes(), &key)?.with_sign_message(message);
            println!("{}", envelope.to_json()?);
        }

        Commands::Open { secret, envelope } => {
            let envelope = read_envelope(&envelope)?;
            let message = envelope
                .sign_message
                .clone()
                .context("envelope carries no signing message; use 'decrypt' for password envelopes")?;

            let mut session = WalletSession::new(LocalSigner::from_secret(secret.into_bytes()));
            session.connect().await?;

            let key = derive_key_from_signature_over(&session, &message).await?;
            let plaintext = decrypt_string(&envelope, &key)?;
            println!("{}", plaintext.as_str());
        }

        Commands::Address { secret } => {
            let signer = LocalSigner::from_secret(secret.into_bytes());
            println!("{}  ({})", signer.address(), short_address(signer.address()));
        }
    }

    Ok(())
}

fn read_envelope(arg: &str) -> anyhow::Result<EncryptedEnvelope> {
    let json = if arg == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("reading envelope from stdin")?;
        buffer
    } else {
        arg.to_string()
    };
    EncryptedEnvelope::from_json(json.trim()).context("parsing envelope JSON")
}
