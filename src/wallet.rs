//! Wallet capability
//!
//! The wallet is an injected collaborator: something that can hand out a
//! public identity and sign transactions for it. The portal only ever sees it
//! through [`WalletProvider`]; a missing capability is modelled as `None` at
//! the call site, not as an error inside the trait.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Failures reported by the wallet capability itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Silent connection refused because the site was never approved
    #[error("site is not trusted")]
    NotTrusted,

    #[error("wallet is not connected")]
    NotConnected,

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Options for a connection request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Only connect if the user already trusts this client; never prompt
    pub only_if_trusted: bool,
}

impl ConnectOptions {
    pub fn trusted_only() -> Self {
        Self { only_if_trusted: true }
    }

    pub fn prompt() -> Self {
        Self { only_if_trusted: false }
    }
}

/// Async wallet capability trait
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Human readable name of the wallet implementation
    fn name(&self) -> &str;

    /// Connect and resolve the wallet's public identity
    async fn connect(&self, options: ConnectOptions) -> Result<Pubkey, WalletError>;

    /// Add the wallet's signature to a transaction that already carries
    /// its recent blockhash
    async fn sign_transaction(&self, transaction: &mut Transaction) -> Result<(), WalletError>;
}

/// Wallet backed by a local keypair file
///
/// `trusted` plays the role of a previously approved site: silent
/// connections only succeed when it is set.
pub struct KeypairWallet {
    keypair: Arc<Keypair>,
    trusted: bool,
    connected: AtomicBool,
}

impl KeypairWallet {
    pub fn from_file(path: impl AsRef<Path>, trusted: bool) -> Result<Self> {
        Ok(Self::from_keypair(load_keypair(path)?, trusted))
    }

    pub fn from_keypair(keypair: Keypair, trusted: bool) -> Self {
        Self {
            keypair: Arc::new(keypair),
            trusted,
            connected: AtomicBool::new(false),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl WalletProvider for KeypairWallet {
    fn name(&self) -> &str {
        "keypair"
    }

    async fn connect(&self, options: ConnectOptions) -> Result<Pubkey, WalletError> {
        if options.only_if_trusted && !self.trusted {
            return Err(WalletError::NotTrusted);
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(self.keypair.pubkey())
    }

    async fn sign_transaction(&self, transaction: &mut Transaction) -> Result<(), WalletError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(WalletError::NotConnected);
        }

        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&*self.keypair], blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))
    }
}

/// web3.js `Keypair` JSON export: `{"_keypair": {"secretKey": {"0": 12, ...}}}`
#[derive(Deserialize)]
struct Web3KeypairExport {
    #[serde(rename = "_keypair")]
    keypair: Web3KeypairInner,
}

#[derive(Deserialize)]
struct Web3KeypairInner {
    #[serde(rename = "secretKey")]
    secret_key: BTreeMap<String, u8>,
}

/// Load a keypair from a file
///
/// Accepts raw 64 bytes, the Solana CLI JSON array, or a web3.js export.
pub fn load_keypair(path: impl AsRef<Path>) -> Result<Keypair> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read keypair file: {}", path.display()))?;

    if bytes.len() == 64 {
        return keypair_from_secret(&bytes);
    }

    if let Ok(json) = serde_json::from_slice::<Vec<u8>>(&bytes) {
        return keypair_from_secret(&json);
    }

    let export: Web3KeypairExport =
        serde_json::from_slice(&bytes).context("Failed to parse keypair JSON")?;
    let mut indexed = export
        .keypair
        .secret_key
        .into_iter()
        .map(|(index, byte)| {
            index
                .parse::<usize>()
                .map(|i| (i, byte))
                .with_context(|| format!("Invalid secret key index: {}", index))
        })
        .collect::<Result<Vec<_>>>()?;
    indexed.sort_by_key(|(i, _)| *i);
    let secret: Vec<u8> = indexed.into_iter().map(|(_, byte)| byte).collect();
    keypair_from_secret(&secret)
}

/// Decode a base58 secret key string
pub fn keypair_from_base58(encoded: &str) -> Result<Keypair> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .context("Invalid base58 secret key")?;
    keypair_from_secret(&bytes)
}

fn keypair_from_secret(bytes: &[u8]) -> Result<Keypair> {
    if bytes.len() != 64 {
        anyhow::bail!("Invalid keypair length: expected 64 bytes, got {}", bytes.len());
    }
    if bytes.iter().all(|&b| b == 0) {
        anyhow::bail!("Invalid keypair: all-zero key rejected");
    }
    Keypair::try_from(bytes).map_err(|e| anyhow::anyhow!("Invalid keypair bytes: {}", e))
}
