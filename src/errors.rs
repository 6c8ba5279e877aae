//! Error types for the portal client
//!
//! Every failure a user action can hit maps onto one [`PortalError`] variant,
//! and every variant maps onto its own [`Notice`] so the user can tell
//! "you need a wallet" apart from "the network failed".

use serde::Serialize;
use solana_client::client_error::ClientError;
use thiserror::Error;

use crate::lifecycle::AccountStatus;
use crate::wallet::WalletError;

/// Local input constraints on a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("GIF link is empty")]
    EmptyLink,

    #[error("submitter name is empty")]
    EmptyName,
}

/// Comprehensive error type for all portal operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    /// No wallet capability is installed at all
    #[error("No wallet capability available")]
    WalletUnavailable,

    /// The wallet refused the connection or signing request
    #[error("Wallet rejected the request: {0}")]
    WalletRejected(String),

    /// An RPC-issuing operation was attempted without a connected identity
    #[error("No connected wallet session")]
    NoSession,

    /// The shared data account has not been created yet
    #[error("Data account {account} does not exist")]
    AccountAbsent { account: String },

    /// Lifecycle transition requested from the wrong state
    #[error("Data account is {status:?}; operation requires an absent account")]
    InvalidAccountState { status: AccountStatus },

    /// Remote program rejected the transaction, or submit/confirm failed
    #[error("Transaction failed during {operation}: {message}")]
    TransactionFailed { operation: String, message: String },

    /// Account payload did not match the expected layout
    #[error("Failed to decode account data: {0}")]
    DecodeFailed(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Transport failure on a read path
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type PortalResult<T> = std::result::Result<T, PortalError>;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Blocking notification shown to the user after a failed action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub text: String,
}

impl PortalError {
    /// Create from ClientError with the operation that produced it
    ///
    /// Classification is message based: the program reports a missing base
    /// account through Anchor's `AccountNotInitialized` (code 3012).
    pub fn from_client_error(err: ClientError, operation: &str) -> Self {
        Self::classify_remote(&err.to_string(), operation)
    }

    /// Classify a remote failure message
    ///
    /// The message does not name the account; `AccountAbsent` carries a
    /// generic label until the caller fills in the address it sent to.
    pub fn classify_remote(message: &str, operation: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("accountnotinitialized")
            || lower.contains("account not initialized")
            || lower.contains("0xbc4")
            || lower.contains("accountnotfound")
            || lower.contains("account not found")
        {
            PortalError::AccountAbsent {
                account: "base_account".to_string(),
            }
        } else if lower.contains("user rejected") || lower.contains("rejected the request") {
            PortalError::WalletRejected(message.to_string())
        } else {
            PortalError::TransactionFailed {
                operation: operation.to_string(),
                message: message.to_string(),
            }
        }
    }

    /// Absent account is an expected terminal state, not a failure to show
    pub fn is_expected_state(&self) -> bool {
        matches!(self, PortalError::AccountAbsent { .. })
    }

    /// Errors resolved locally, before any network traffic
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            PortalError::Validation(_)
                | PortalError::NoSession
                | PortalError::WalletUnavailable
                | PortalError::InvalidAccountState { .. }
        )
    }

    /// User-facing notification for this error
    pub fn notice(&self) -> Notice {
        match self {
            PortalError::WalletUnavailable => Notice {
                level: NoticeLevel::Error,
                title: "Solana wallet not found!",
                text: "This client needs a Solana wallet so it can talk to the Solana \
                       blockchain. Install a wallet such as Phantom and try again."
                    .to_string(),
            },
            PortalError::WalletRejected(reason) => Notice {
                level: NoticeLevel::Warning,
                title: "Wallet request declined",
                text: format!("The wallet did not approve the request ({}).", reason),
            },
            PortalError::NoSession => Notice {
                level: NoticeLevel::Warning,
                title: "Wallet not connected",
                text: "Connect your wallet before talking to the GIF program.".to_string(),
            },
            PortalError::AccountAbsent { .. } => Notice {
                level: NoticeLevel::Info,
                title: "GIF account not initialized",
                text: "Do the one-time initialization of the GIF program account first."
                    .to_string(),
            },
            PortalError::InvalidAccountState { status } => Notice {
                level: NoticeLevel::Info,
                title: "Nothing to initialize",
                text: format!("The GIF program account is {:?}.", status),
            },
            PortalError::TransactionFailed { operation, message } => Notice {
                level: NoticeLevel::Error,
                title: "Transaction failed",
                text: format!("{} did not go through: {}", operation, message),
            },
            PortalError::DecodeFailed(reason) => Notice {
                level: NoticeLevel::Error,
                title: "Unreadable GIF account",
                text: format!("The GIF program account has an unexpected layout: {}", reason),
            },
            PortalError::Validation(ValidationError::EmptyLink) => Notice {
                level: NoticeLevel::Warning,
                title: "Link to GIF missing?",
                text: "Please enter a valid GIF link in the text-box above!".to_string(),
            },
            PortalError::Validation(ValidationError::EmptyName) => Notice {
                level: NoticeLevel::Warning,
                title: "Name field empty...",
                text: "Please enter your name or alibi in the box above!".to_string(),
            },
            PortalError::Rpc(message) => Notice {
                level: NoticeLevel::Error,
                title: "Network error",
                text: format!("Could not reach the Solana cluster: {}", message),
            },
            PortalError::Configuration(message) => Notice {
                level: NoticeLevel::Error,
                title: "Configuration error",
                text: message.clone(),
            },
        }
    }
}

impl From<WalletError> for PortalError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Rejected(reason) => PortalError::WalletRejected(reason),
            WalletError::NotTrusted => {
                PortalError::WalletRejected("site is not trusted by the wallet".to_string())
            }
            WalletError::NotConnected => PortalError::NoSession,
            WalletError::Signing(message) => PortalError::TransactionFailed {
                operation: "sign".to_string(),
                message,
            },
        }
    }
}
