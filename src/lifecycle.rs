//! One-time creation of the shared base account
//!
//! `Unknown → Absent | Present` through [`AccountLifecycle::probe`],
//! `Absent → Present` through [`AccountLifecycle::initialize`]. Present is
//! terminal: the program rejects a second creation, so the client never
//! attempts one.

use serde::Serialize;
use solana_sdk::signature::Signature;
use tracing::{info, warn};

use crate::errors::{PortalError, PortalResult};
use crate::list_sync::{ListState, ListSyncEngine};
use crate::program::ProgramBinding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccountStatus {
    Unknown,
    Absent,
    Present,
}

#[derive(Debug)]
pub struct AccountLifecycle {
    status: AccountStatus,
}

impl Default for AccountLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountLifecycle {
    pub fn new() -> Self {
        Self {
            status: AccountStatus::Unknown,
        }
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    /// Follow a confirmed read of the list
    ///
    /// `NotLoaded` carries no information and leaves the status alone.
    pub fn observe(&mut self, list: &ListState) {
        let status = match list {
            ListState::NotLoaded => return,
            ListState::Uninitialized => AccountStatus::Absent,
            ListState::Loaded(_) => AccountStatus::Present,
        };
        if status != self.status {
            info!(from = ?self.status, to = ?status, "Account status changed by list read");
            self.status = status;
        }
    }

    /// Detect whether the base account exists
    ///
    /// A missing or undecodable account is reported as `Absent`; only
    /// transport failures come back as errors, leaving the status `Unknown`.
    pub async fn probe(
        &mut self,
        binding: &ProgramBinding,
        list: &mut ListSyncEngine,
    ) -> PortalResult<AccountStatus> {
        match binding.fetch_account().await {
            Ok(account) => {
                list.store(account);
                self.status = AccountStatus::Present;
            }
            Err(PortalError::AccountAbsent { .. }) => {
                list.mark_uninitialized();
                self.status = AccountStatus::Absent;
            }
            Err(PortalError::DecodeFailed(reason)) => {
                warn!(reason = %reason, "Base account unreadable, treating as absent");
                list.mark_uninitialized();
                self.status = AccountStatus::Absent;
            }
            Err(e) => {
                warn!(error = %e, "Account probe failed");
                self.status = AccountStatus::Unknown;
                return Err(e);
            }
        }

        info!(status = ?self.status, account = %binding.data_account_id, "Probed base account");
        Ok(self.status)
    }

    /// Create the base account; only valid while `Absent`
    ///
    /// After confirmation the status is `Present` even if the follow-up list
    /// sync fails; that failure is still returned.
    pub async fn initialize(
        &mut self,
        binding: &ProgramBinding,
        list: &mut ListSyncEngine,
    ) -> PortalResult<Signature> {
        if self.status != AccountStatus::Absent {
            return Err(PortalError::InvalidAccountState {
                status: self.status,
            });
        }

        let signature = binding.start_stuff_off().await.map_err(|e| {
            warn!(error = %e, "Base account creation failed");
            e
        })?;
        self.status = AccountStatus::Present;

        list.refresh(binding).await?;
        self.observe(list.state());
        Ok(signature)
    }
}
