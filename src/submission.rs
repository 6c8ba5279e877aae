//! Submission of new list entries

use solana_sdk::signature::Signature;
use tracing::{info, warn};

use crate::errors::{PortalError, PortalResult, ValidationError};
use crate::lifecycle::{AccountLifecycle, AccountStatus};
use crate::list_sync::ListSyncEngine;
use crate::program::{Deployment, ProgramBinding};
use crate::session::SessionManager;

/// The two input fields the user edits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub link: String,
    pub name: String,
}

impl EntryDraft {
    pub fn new(link: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            name: name.into(),
        }
    }

    pub fn clear(&mut self) {
        self.link.clear();
        self.name.clear();
    }
}

/// Validated, trimmed entry ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEntry {
    pub link: String,
    pub name: String,
}

pub fn validate(draft: &EntryDraft) -> Result<ValidEntry, ValidationError> {
    let link = draft.link.trim();
    if link.is_empty() {
        return Err(ValidationError::EmptyLink);
    }
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(ValidEntry {
        link: link.to_string(),
        name: name.to_string(),
    })
}

/// Borrowed view of the state a submission reads and writes
pub struct SubmissionPipeline<'a> {
    pub sessions: &'a SessionManager,
    pub deployment: &'a Deployment,
    pub lifecycle: &'a mut AccountLifecycle,
    pub list: &'a mut ListSyncEngine,
}

impl SubmissionPipeline<'_> {
    /// Validate, clear the inputs, append remotely, then re-sync
    ///
    /// Local checks (input, session, known-absent account) fail before any
    /// network traffic and leave the draft intact. Once past them the draft
    /// is cleared whatever the transaction outcome. A program-reported
    /// missing account marks the list uninitialized and the status absent.
    pub async fn submit(&mut self, draft: &mut EntryDraft) -> PortalResult<Signature> {
        let entry = validate(draft)?;
        let binding = ProgramBinding::derive(self.sessions, self.deployment)?;
        if self.lifecycle.status() == AccountStatus::Absent {
            return Err(PortalError::AccountAbsent {
                account: binding.data_account_id.to_string(),
            });
        }

        draft.clear();
        info!(link = %entry.link, name = %entry.name, "Submitting GIF");

        let signature = match binding.add_gif(&entry.link, &entry.name).await {
            Ok(signature) => signature,
            Err(e @ PortalError::AccountAbsent { .. }) => {
                warn!(error = %e, "Program reports the base account missing");
                self.list.mark_uninitialized();
                self.lifecycle.observe(self.list.state());
                return Err(e);
            }
            Err(e) => {
                warn!(error = %e, link = %entry.link, "GIF submission failed");
                return Err(e);
            }
        };
        info!(signature = %signature, "GIF confirmed by program");

        self.list.refresh(&binding).await?;
        self.lifecycle.observe(self.list.state());
        Ok(signature)
    }
}
