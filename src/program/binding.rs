//! Binding between a connected wallet and the GIF program
//!
//! A [`ProgramBinding`] is derived fresh for every RPC-issuing operation from
//! the current session and the fixed [`Deployment`], so a changed wallet
//! identity is picked up on the very next call.

use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use solana_system_interface::program as system_program;
use std::sync::Arc;
use tracing::{debug, info};

use super::codec::{self, BaseAccount};
use super::ledger::LedgerClient;
use crate::errors::{PortalError, PortalResult};
use crate::session::SessionManager;
use crate::wallet::WalletProvider;

/// Fixed, process-wide description of where the program and its account live
#[derive(Clone)]
pub struct Deployment {
    pub ledger: Arc<dyn LedgerClient>,
    pub commitment: CommitmentConfig,
    pub program_id: Pubkey,
    /// Shared keypair of the base account; every client holds the same one
    pub data_account: Arc<Keypair>,
}

impl Deployment {
    pub fn data_account_id(&self) -> Pubkey {
        self.data_account.pubkey()
    }
}

/// Per-call handle for reading the account and submitting transactions
pub struct ProgramBinding {
    pub network_endpoint: String,
    pub commitment: CommitmentConfig,
    pub program_id: Pubkey,
    pub data_account_id: Pubkey,
    pub wallet_id: Pubkey,
    ledger: Arc<dyn LedgerClient>,
    data_account: Arc<Keypair>,
    wallet: Arc<dyn WalletProvider>,
}

impl ProgramBinding {
    /// Derive a binding; fails with `NoSession` unless a wallet is connected
    pub fn derive(sessions: &SessionManager, deployment: &Deployment) -> PortalResult<Self> {
        let wallet_id = sessions
            .session()
            .public_identity()
            .ok_or(PortalError::NoSession)?;
        let wallet = sessions.wallet().cloned().ok_or(PortalError::NoSession)?;

        Ok(Self {
            network_endpoint: deployment.ledger.endpoint(),
            commitment: deployment.commitment,
            program_id: deployment.program_id,
            data_account_id: deployment.data_account_id(),
            wallet_id,
            ledger: Arc::clone(&deployment.ledger),
            data_account: Arc::clone(&deployment.data_account),
            wallet,
        })
    }

    /// Read and decode the base account
    pub async fn fetch_account(&self) -> PortalResult<BaseAccount> {
        let account = self
            .ledger
            .get_account(&self.data_account_id)
            .await?
            .ok_or_else(|| PortalError::AccountAbsent {
                account: self.data_account_id.to_string(),
            })?;

        if account.owner != self.program_id {
            return Err(PortalError::DecodeFailed(format!(
                "account owned by {}, expected {}",
                account.owner, self.program_id
            )));
        }

        let decoded = BaseAccount::decode(&account.data)?;
        debug!(
            account = %self.data_account_id,
            entries = decoded.gif_list.len(),
            total_gifs = decoded.total_gifs,
            "Decoded base account"
        );
        Ok(decoded)
    }

    /// Create the base account with the connected wallet as payer
    pub async fn start_stuff_off(&self) -> PortalResult<Signature> {
        let instruction = Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(self.data_account_id, true),
                AccountMeta::new(self.wallet_id, true),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            data: codec::start_stuff_off_data(),
        };

        let signature = self
            .sign_and_send(instruction, true, codec::START_STUFF_OFF)
            .await?;
        info!(
            account = %self.data_account_id,
            signature = %signature,
            "Created base account"
        );
        Ok(signature)
    }

    /// Append one entry to the shared list
    pub async fn add_gif(&self, link: &str, name: &str) -> PortalResult<Signature> {
        let instruction = Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(self.data_account_id, false),
                AccountMeta::new(self.wallet_id, true),
            ],
            data: codec::add_gif_data(link, name),
        };

        self.sign_and_send(instruction, false, codec::ADD_GIF).await
    }

    async fn sign_and_send(
        &self,
        instruction: Instruction,
        cosign_data_account: bool,
        operation: &str,
    ) -> PortalResult<Signature> {
        let blockhash = self
            .ledger
            .latest_blockhash()
            .await
            .map_err(|e| match e {
                PortalError::Rpc(message) => PortalError::TransactionFailed {
                    operation: operation.to_string(),
                    message,
                },
                other => other,
            })?;
        let mut transaction = Transaction::new_with_payer(&[instruction], Some(&self.wallet_id));
        transaction.message.recent_blockhash = blockhash;

        if cosign_data_account {
            transaction
                .try_partial_sign(&[&*self.data_account], blockhash)
                .map_err(|e| PortalError::TransactionFailed {
                    operation: operation.to_string(),
                    message: e.to_string(),
                })?;
        }
        self.wallet.sign_transaction(&mut transaction).await?;

        self.ledger
            .send_and_confirm(&transaction, operation)
            .await
            .map_err(|e| match e {
                PortalError::AccountAbsent { .. } => PortalError::AccountAbsent {
                    account: self.data_account_id.to_string(),
                },
                other => other,
            })
    }
}
