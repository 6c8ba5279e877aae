//! Configuration module for the GIF portal client
//!
//! Configuration is loaded once at startup from a TOML file, then
//! overridden from the environment (a `.env` file is honoured).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Keypair};
use std::str::FromStr;

use crate::wallet::{keypair_from_base58, load_keypair};

pub const ENV_RPC_URL: &str = "GIF_PORTAL_RPC_URL";
pub const ENV_COMMITMENT: &str = "GIF_PORTAL_COMMITMENT";
pub const ENV_PROGRAM_ID: &str = "GIF_PORTAL_PROGRAM_ID";
pub const ENV_BASE_ACCOUNT_SECRET: &str = "GIF_PORTAL_BASE_ACCOUNT_SECRET";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cluster connection
    #[serde(default)]
    pub rpc: RpcConfig,

    /// GIF program and its shared base account
    #[serde(default)]
    pub program: ProgramConfig,

    /// Wallet capability
    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub url: String,

    /// processed | confirmed | finalized
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Base58 program id
    #[serde(default = "default_program_id")]
    pub program_id: String,

    /// Keypair file of the shared base account
    #[serde(default = "default_base_account_keypair")]
    pub base_account_keypair_path: String,

    /// Base58 secret of the base account; takes precedence over the file
    #[serde(default, skip_serializing)]
    pub base_account_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Keypair file backing the wallet capability; no wallet when unset
    #[serde(default)]
    pub keypair_path: Option<String>,

    /// Allow silent connection at startup
    #[serde(default)]
    pub trusted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub json: bool,
}

// Default value functions
fn default_rpc_url() -> String { "https://api.devnet.solana.com".to_string() }
fn default_commitment() -> String { "processed".to_string() }
fn default_program_id() -> String { "GZnUtzwNfMrsK7U9NZT1PwrgnUnu6z9cGwc1v1Q7e5ta".to_string() }
fn default_base_account_keypair() -> String { "keypair.json".to_string() }
fn default_log_filter() -> String { "gif_portal=info,warn".to_string() }

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            commitment: default_commitment(),
        }
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            program_id: default_program_id(),
            base_account_keypair_path: default_base_account_keypair(),
            base_account_secret: None,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: None,
            trusted: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            program: ProgramConfig::default(),
            wallet: WalletConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Parse a commitment level name
pub fn parse_commitment(level: &str) -> Result<CommitmentConfig> {
    match level.trim().to_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => anyhow::bail!("Unknown commitment level: {}", other),
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid configuration TOML")?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `GIF_PORTAL_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_RPC_URL) {
            self.rpc.url = url;
        }
        if let Some(commitment) = lookup(ENV_COMMITMENT) {
            self.rpc.commitment = commitment;
        }
        if let Some(program_id) = lookup(ENV_PROGRAM_ID) {
            self.program.program_id = program_id;
        }
        if let Some(secret) = lookup(ENV_BASE_ACCOUNT_SECRET) {
            self.program.base_account_secret = Some(secret);
        }
    }

    /// Check values that can be checked without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        if !(self.rpc.url.starts_with("http://") || self.rpc.url.starts_with("https://")) {
            anyhow::bail!("RPC url must be http(s): {}", self.rpc.url);
        }
        parse_commitment(&self.rpc.commitment)?;
        self.program_id()?;
        Ok(())
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        parse_commitment(&self.rpc.commitment)
    }

    pub fn program_id(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.program.program_id)
            .with_context(|| format!("Invalid program id: {}", self.program.program_id))
    }

    /// Resolve the shared base account keypair
    pub fn base_account_keypair(&self) -> Result<Keypair> {
        match &self.program.base_account_secret {
            Some(secret) => keypair_from_base58(secret).context("Invalid base account secret"),
            None => load_keypair(&self.program.base_account_keypair_path)
                .context("Failed to load base account keypair"),
        }
    }
}
