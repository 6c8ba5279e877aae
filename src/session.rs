//! Wallet session management
//!
//! [`SessionManager`] is the only writer of [`WalletSession`]. The public
//! identity is present exactly when the status is `Connected`; the session
//! type keeps its fields private so no other code path can break that.

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::{PortalError, PortalResult};
use crate::wallet::{ConnectOptions, WalletError, WalletProvider};

/// Connection status of the wallet session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
    /// No wallet capability exists at all
    Unavailable,
}

/// Wallet connection state for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    status: SessionStatus,
    public_identity: Option<Pubkey>,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self {
            status: SessionStatus::Disconnected,
            public_identity: None,
        }
    }

    fn with_status(status: SessionStatus) -> Self {
        debug_assert_ne!(status, SessionStatus::Connected);
        Self {
            status,
            public_identity: None,
        }
    }

    fn connected(identity: Pubkey) -> Self {
        Self {
            status: SessionStatus::Connected,
            public_identity: Some(identity),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn public_identity(&self) -> Option<Pubkey> {
        self.public_identity
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// Owns the wallet capability and the session it produces
pub struct SessionManager {
    wallet: Option<Arc<dyn WalletProvider>>,
    session: WalletSession,
}

impl SessionManager {
    pub fn new(wallet: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            wallet,
            session: WalletSession::disconnected(),
        }
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// The injected capability, if one is installed
    pub fn wallet(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.wallet.as_ref()
    }

    /// Silent connection for a previously trusted client
    ///
    /// Never fails outward: on any failure the session is left as it was.
    pub async fn try_auto_connect(&mut self) {
        let Some(wallet) = self.wallet.clone() else {
            warn!("No wallet capability found, staying disconnected");
            return;
        };

        let previous = std::mem::replace(
            &mut self.session,
            WalletSession::with_status(SessionStatus::Connecting),
        );

        match wallet.connect(ConnectOptions::trusted_only()).await {
            Ok(identity) => {
                info!(wallet = %wallet.name(), identity = %identity, "Auto-connected wallet");
                self.session = WalletSession::connected(identity);
            }
            Err(WalletError::NotTrusted) => {
                debug!(wallet = %wallet.name(), "Wallet has not trusted this client yet");
                self.session = previous;
            }
            Err(e) => {
                warn!(wallet = %wallet.name(), error = %e, "Auto-connect failed");
                self.session = previous;
            }
        }
    }

    /// Explicit, user-prompted connection
    pub async fn connect(&mut self) -> PortalResult<Pubkey> {
        let Some(wallet) = self.wallet.clone() else {
            warn!("Connect requested but no wallet capability is installed");
            self.session = WalletSession::with_status(SessionStatus::Unavailable);
            return Err(PortalError::WalletUnavailable);
        };

        self.session = WalletSession::with_status(SessionStatus::Connecting);

        match wallet.connect(ConnectOptions::prompt()).await {
            Ok(identity) => {
                info!(wallet = %wallet.name(), identity = %identity, "Connected wallet");
                self.session = WalletSession::connected(identity);
                Ok(identity)
            }
            Err(e) => {
                warn!(wallet = %wallet.name(), error = %e, "Wallet connection failed");
                self.session = WalletSession::disconnected();
                Err(PortalError::from(e))
            }
        }
    }
}
