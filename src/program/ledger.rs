//! Ledger access
//!
//! [`LedgerClient`] is the seam between the portal and the cluster. The
//! production implementation talks JSON-RPC through the nonblocking
//! `RpcClient`; tests swap in an in-memory ledger.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use tracing::{debug, instrument};

use crate::errors::{PortalError, PortalResult};

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Endpoint this client talks to, for logging
    fn endpoint(&self) -> String;

    /// Read an account; `Ok(None)` when it does not exist
    async fn get_account(&self, pubkey: &Pubkey) -> PortalResult<Option<Account>>;

    async fn latest_blockhash(&self) -> PortalResult<Hash>;

    /// Submit a fully signed transaction and wait until it reaches the
    /// client's commitment level
    async fn send_and_confirm(
        &self,
        transaction: &Transaction,
        operation: &str,
    ) -> PortalResult<Signature>;
}

/// JSON-RPC ledger client
pub struct RpcLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcLedger {
    pub fn new(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url.into(), commitment),
            commitment,
        }
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    fn endpoint(&self) -> String {
        self.client.url()
    }

    #[instrument(skip(self), fields(endpoint = %self.client.url()))]
    async fn get_account(&self, pubkey: &Pubkey) -> PortalResult<Option<Account>> {
        let response = self
            .client
            .get_account_with_commitment(pubkey, self.commitment)
            .await
            .map_err(|e| PortalError::Rpc(e.to_string()))?;
        debug!(slot = response.context.slot, found = response.value.is_some(), "Fetched account");
        Ok(response.value)
    }

    async fn latest_blockhash(&self) -> PortalResult<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| PortalError::Rpc(e.to_string()))
    }

    #[instrument(skip(self, transaction), fields(endpoint = %self.client.url()))]
    async fn send_and_confirm(
        &self,
        transaction: &Transaction,
        operation: &str,
    ) -> PortalResult<Signature> {
        self.client
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(|e| PortalError::from_client_error(e, operation))
    }
}
