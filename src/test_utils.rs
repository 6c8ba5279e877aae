//! Test Utilities Module
//!
//! In-memory stand-ins for the cluster and the wallet extension. The fake
//! ledger executes the GIF program's two instructions against its own
//! account map, so reads after writes behave like the real program.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use async_trait::async_trait;
use borsh::BorshDeserialize;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::{PortalError, PortalResult};
use crate::program::codec::{self, AddGifArgs, BaseAccount, GifEntry, BASE_ACCOUNT_SPACE};
use crate::program::{Deployment, LedgerClient};
use crate::wallet::{ConnectOptions, WalletError, WalletProvider};

/// In-memory ledger hosting a single deployment of the GIF program
pub struct FakeLedger {
    program_id: Pubkey,
    accounts: Mutex<HashMap<Pubkey, Account>>,
    reads: AtomicUsize,
    sends: AtomicUsize,
    fail_next_send: Mutex<Option<String>>,
    fail_reads: Mutex<Option<String>>,
}

impl FakeLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            accounts: Mutex::new(HashMap::new()),
            reads: AtomicUsize::new(0),
            sends: AtomicUsize::new(0),
            fail_next_send: Mutex::new(None),
            fail_reads: Mutex::new(None),
        }
    }

    /// Number of account reads served
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of transactions received, successful or not
    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    /// Make the next transaction fail with `message` without applying it
    pub async fn fail_next_send(&self, message: &str) {
        *self.fail_next_send.lock().await = Some(message.to_string());
    }

    /// Make every read, blockhash included, fail with a transport error until cleared
    pub async fn fail_reads(&self, message: Option<&str>) {
        *self.fail_reads.lock().await = message.map(str::to_string);
    }

    /// Seed the base account directly, as if other clients had written it
    pub async fn seed_base_account(&self, account: Pubkey, entries: Vec<GifEntry>) {
        let state = BaseAccount {
            total_gifs: entries.len() as u64,
            gif_list: entries,
        };
        self.put(account, &state).await;
    }

    /// Store arbitrary bytes under the program's ownership
    pub async fn put_raw(&self, pubkey: Pubkey, data: Vec<u8>) {
        self.accounts.lock().await.insert(pubkey, self.program_account(data));
    }

    /// Current decoded list, bypassing the client
    pub async fn entries(&self, account: &Pubkey) -> Option<Vec<GifEntry>> {
        let accounts = self.accounts.lock().await;
        let stored = accounts.get(account)?;
        BaseAccount::decode(&stored.data).ok().map(|a| a.gif_list)
    }

    async fn put(&self, pubkey: Pubkey, state: &BaseAccount) {
        let data = state
            .encode(BASE_ACCOUNT_SPACE)
            .expect("fake account fits its allocation");
        self.put_raw(pubkey, data).await;
    }

    fn program_account(&self, data: Vec<u8>) -> Account {
        Account {
            lamports: 1_000_000,
            data,
            owner: self.program_id,
            executable: false,
            rent_epoch: 0,
        }
    }

    async fn execute(&self, transaction: &Transaction) -> Result<(), String> {
        transaction
            .verify()
            .map_err(|e| format!("signature verification failed: {}", e))?;

        let message = &transaction.message;
        for instruction in &message.instructions {
            let program_id = instruction.program_id(&message.account_keys);
            if *program_id != self.program_id {
                return Err(format!("unknown program {}", program_id));
            }
            let keys: Vec<Pubkey> = instruction
                .accounts
                .iter()
                .map(|&i| message.account_keys[i as usize])
                .collect();
            let base = *keys.first().ok_or("missing base account")?;
            if instruction.data.len() < codec::DISCRIMINATOR_LEN {
                return Err("instruction data too short".to_string());
            }
            let (tag, mut args) = instruction.data.split_at(codec::DISCRIMINATOR_LEN);

            if tag == codec::instruction_discriminator(codec::START_STUFF_OFF) {
                if !message.is_signer(base_index(message, &base)) {
                    return Err("base account did not sign".to_string());
                }
                if keys.get(2) != Some(&solana_system_interface::program::ID) {
                    return Err("system program account missing".to_string());
                }
                let mut accounts = self.accounts.lock().await;
                if accounts.contains_key(&base) {
                    return Err(format!(
                        "Allocate: account Address {{ address: {}, base: None }} already in use",
                        base
                    ));
                }
                let data = BaseAccount::default()
                    .encode(BASE_ACCOUNT_SPACE)
                    .map_err(|e| e.to_string())?;
                accounts.insert(base, self.program_account(data));
            } else if tag == codec::instruction_discriminator(codec::ADD_GIF) {
                let args = AddGifArgs::deserialize(&mut args).map_err(|e| e.to_string())?;
                let mut accounts = self.accounts.lock().await;
                let stored = accounts.get_mut(&base).ok_or_else(|| {
                    "custom program error: 0xbc4 (AccountNotInitialized)".to_string()
                })?;
                let mut state = BaseAccount::decode(&stored.data).map_err(|e| e.to_string())?;
                state.gif_list.push(GifEntry::new(args.gif_link, args.user_name));
                state.total_gifs += 1;
                stored.data = state.encode(BASE_ACCOUNT_SPACE).map_err(|e| e.to_string())?;
            } else {
                return Err("InstructionFallbackNotFound".to_string());
            }
        }
        Ok(())
    }
}

fn base_index(message: &solana_sdk::message::Message, key: &Pubkey) -> usize {
    message
        .account_keys
        .iter()
        .position(|k| k == key)
        .unwrap_or(usize::MAX)
}

#[async_trait]
impl LedgerClient for FakeLedger {
    fn endpoint(&self) -> String {
        "memory://fake-ledger".to_string()
    }

    async fn get_account(&self, pubkey: &Pubkey) -> PortalResult<Option<Account>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_reads.lock().await.clone() {
            return Err(PortalError::Rpc(message));
        }
        Ok(self.accounts.lock().await.get(pubkey).cloned())
    }

    async fn latest_blockhash(&self) -> PortalResult<Hash> {
        if let Some(message) = self.fail_reads.lock().await.clone() {
            return Err(PortalError::Rpc(message));
        }
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm(
        &self,
        transaction: &Transaction,
        operation: &str,
    ) -> PortalResult<Signature> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_next_send.lock().await.take() {
            return Err(PortalError::classify_remote(&message, operation));
        }
        self.execute(transaction)
            .await
            .map_err(|message| PortalError::classify_remote(&message, operation))?;
        Ok(transaction.signatures[0])
    }
}

/// Scriptable wallet capability
pub struct MockWallet {
    keypair: Keypair,
    trusted: bool,
    reject_connect: AtomicBool,
    reject_signing: AtomicBool,
}

impl MockWallet {
    pub fn new(trusted: bool) -> Self {
        Self {
            keypair: Keypair::new(),
            trusted,
            reject_connect: AtomicBool::new(false),
            reject_signing: AtomicBool::new(false),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn reject_connect(&self, reject: bool) {
        self.reject_connect.store(reject, Ordering::SeqCst);
    }

    pub fn reject_signing(&self, reject: bool) {
        self.reject_signing.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self, options: ConnectOptions) -> Result<Pubkey, WalletError> {
        if options.only_if_trusted && !self.trusted {
            return Err(WalletError::NotTrusted);
        }
        if self.reject_connect.load(Ordering::SeqCst) {
            return Err(WalletError::Rejected("User rejected the request.".to_string()));
        }
        Ok(self.keypair.pubkey())
    }

    async fn sign_transaction(&self, transaction: &mut Transaction) -> Result<(), WalletError> {
        if self.reject_signing.load(Ordering::SeqCst) {
            return Err(WalletError::Rejected("User rejected the request.".to_string()));
        }
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))
    }
}

/// Fake ledger, deployment and wallet wired together
pub struct TestCluster {
    pub ledger: Arc<FakeLedger>,
    pub deployment: Deployment,
    pub wallet: Arc<MockWallet>,
}

impl TestCluster {
    pub fn new(trusted: bool) -> Self {
        let program_id = Pubkey::new_unique();
        let ledger = Arc::new(FakeLedger::new(program_id));
        let deployment = Deployment {
            ledger: ledger.clone(),
            commitment: CommitmentConfig::processed(),
            program_id,
            data_account: Arc::new(Keypair::new()),
        };
        Self {
            ledger,
            deployment,
            wallet: Arc::new(MockWallet::new(trusted)),
        }
    }

    pub fn data_account(&self) -> Pubkey {
        self.deployment.data_account_id()
    }

    pub fn wallet_provider(&self) -> Arc<dyn WalletProvider> {
        self.wallet.clone()
    }
}
