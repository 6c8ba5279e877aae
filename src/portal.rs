//! Application state
//!
//! [`GifPortal`] owns every piece of mutable client state. Each action takes
//! `&mut self`, so overlapping operations on one portal are serialized; share
//! it across tasks behind a `tokio::sync::Mutex`.

use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::sync::Arc;

use crate::errors::PortalResult;
use crate::lifecycle::{AccountLifecycle, AccountStatus};
use crate::list_sync::{ListState, ListSyncEngine};
use crate::program::{Deployment, ProgramBinding};
use crate::session::{SessionManager, WalletSession};
use crate::structured_logging::StructuredLogger;
use crate::submission::{EntryDraft, SubmissionPipeline};
use crate::view::PortalView;
use crate::wallet::WalletProvider;

pub struct GifPortal {
    deployment: Deployment,
    sessions: SessionManager,
    lifecycle: AccountLifecycle,
    list: ListSyncEngine,
    /// Current contents of the link and name inputs
    pub draft: EntryDraft,
    logger: StructuredLogger,
}

impl GifPortal {
    pub fn new(deployment: Deployment, wallet: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            deployment,
            sessions: SessionManager::new(wallet),
            lifecycle: AccountLifecycle::new(),
            list: ListSyncEngine::new(),
            draft: EntryDraft::default(),
            logger: StructuredLogger::default(),
        }
    }

    pub fn session(&self) -> &WalletSession {
        self.sessions.session()
    }

    pub fn account_status(&self) -> AccountStatus {
        self.lifecycle.status()
    }

    pub fn list_state(&self) -> &ListState {
        self.list.state()
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn view(&self) -> PortalView {
        PortalView::derive(self.sessions.session(), self.list.state(), self.list.total_gifs())
    }

    /// Startup step: silent connect, then probe the account if connected
    ///
    /// A failed probe is returned but the session stays connected.
    pub async fn start(&mut self) -> PortalResult<()> {
        self.logger.log_action_started("start");
        self.sessions.try_auto_connect().await;
        if self.sessions.session().is_connected() {
            self.probe().await?;
        }
        Ok(())
    }

    /// Prompted connect, followed by a probe of the account
    pub async fn connect(&mut self) -> PortalResult<Pubkey> {
        self.logger.log_action_started("connect");
        let identity = match self.sessions.connect().await {
            Ok(identity) => identity,
            Err(e) => {
                self.logger.log_action_failed("connect", &e);
                return Err(e);
            }
        };
        self.logger.log_action_succeeded("connect", &identity.to_string());
        self.probe().await?;
        Ok(identity)
    }

    pub async fn probe(&mut self) -> PortalResult<AccountStatus> {
        self.logger.log_action_started("probe");
        let result = async {
            let binding = ProgramBinding::derive(&self.sessions, &self.deployment)?;
            self.lifecycle.probe(&binding, &mut self.list).await
        }
        .await;
        match &result {
            Ok(status) => self.logger.log_action_succeeded("probe", &format!("{:?}", status)),
            Err(e) => self.logger.log_action_failed("probe", e),
        }
        result
    }

    pub async fn initialize_account(&mut self) -> PortalResult<Signature> {
        self.logger.log_action_started("initialize");
        let result = async {
            let binding = ProgramBinding::derive(&self.sessions, &self.deployment)?;
            self.lifecycle.initialize(&binding, &mut self.list).await
        }
        .await;
        self.log_signature("initialize", &result);
        result
    }

    /// Submit whatever is in the draft
    pub async fn submit(&mut self) -> PortalResult<Signature> {
        self.logger.log_action_started("submit");
        let mut pipeline = SubmissionPipeline {
            sessions: &self.sessions,
            deployment: &self.deployment,
            lifecycle: &mut self.lifecycle,
            list: &mut self.list,
        };
        let result = pipeline.submit(&mut self.draft).await;
        self.log_signature("submit", &result);
        result
    }

    /// Fill the draft and submit it
    pub async fn submit_entry(&mut self, link: &str, name: &str) -> PortalResult<Signature> {
        self.draft = EntryDraft::new(link, name);
        self.submit().await
    }

    pub async fn refresh(&mut self) -> PortalResult<&ListState> {
        self.logger.log_action_started("refresh");
        let binding = match ProgramBinding::derive(&self.sessions, &self.deployment) {
            Ok(binding) => binding,
            Err(e) => {
                self.logger.log_action_failed("refresh", &e);
                return Err(e);
            }
        };
        if let Err(e) = self.list.refresh(&binding).await {
            self.logger.log_action_failed("refresh", &e);
            return Err(e);
        }
        self.lifecycle.observe(self.list.state());
        Ok(self.list.state())
    }

    fn log_signature(&self, action: &str, result: &PortalResult<Signature>) {
        match result {
            Ok(signature) => self.logger.log_action_succeeded(action, &signature.to_string()),
            Err(e) => self.logger.log_action_failed(action, e),
        }
    }
}
