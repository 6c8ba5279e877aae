//! Local mirror of the shared GIF list
//!
//! The remote account is authoritative. Every successful read replaces the
//! local list wholesale; nothing is ever appended locally.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{PortalError, PortalResult};
use crate::program::{BaseAccount, GifEntry, ProgramBinding};

/// Local list state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "entries", rename_all = "snake_case")]
pub enum ListState {
    /// No read has completed yet
    NotLoaded,
    /// The base account does not exist; distinct from an empty list
    Uninitialized,
    Loaded(Vec<GifEntry>),
}

#[derive(Debug)]
pub struct ListSyncEngine {
    state: ListState,
    total_gifs: u64,
}

impl Default for ListSyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ListSyncEngine {
    pub fn new() -> Self {
        Self {
            state: ListState::NotLoaded,
            total_gifs: 0,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn entries(&self) -> Option<&[GifEntry]> {
        match &self.state {
            ListState::Loaded(entries) => Some(entries),
            _ => None,
        }
    }

    /// Counter kept by the program alongside the list
    pub fn total_gifs(&self) -> u64 {
        self.total_gifs
    }

    /// Re-read the list through a fresh binding
    pub async fn refresh(&mut self, binding: &ProgramBinding) -> PortalResult<&ListState> {
        match binding.fetch_account().await {
            Ok(account) => {
                self.store(account);
                Ok(&self.state)
            }
            Err(PortalError::AccountAbsent { account }) => {
                info!(account = %account, "Base account not initialized yet");
                self.mark_uninitialized();
                Ok(&self.state)
            }
            Err(e) => {
                warn!(error = %e, "List refresh failed, keeping previous list");
                Err(e)
            }
        }
    }

    /// Replace local state with a confirmed remote read
    pub(crate) fn store(&mut self, account: BaseAccount) {
        info!(entries = account.gif_list.len(), total_gifs = account.total_gifs, "Synced GIF list");
        self.total_gifs = account.total_gifs;
        self.state = ListState::Loaded(account.gif_list);
    }

    pub(crate) fn mark_uninitialized(&mut self) {
        self.total_gifs = 0;
        self.state = ListState::Uninitialized;
    }
}
