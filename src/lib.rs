//! GIF Portal client library
//!
//! Wallet-authenticated client for a single shared on-chain GIF list:
//! session handling, one-time account bootstrap, entry submission and
//! keeping the local list in step with the program's account.

pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod list_sync;
pub mod portal;
pub mod program;
pub mod session;
pub mod structured_logging;
pub mod submission;
pub mod view;
pub mod wallet;

pub mod test_utils;

// Re-export commonly used types
pub use errors::{Notice, PortalError, PortalResult, ValidationError};
pub use lifecycle::AccountStatus;
pub use list_sync::ListState;
pub use portal::GifPortal;
pub use program::{Deployment, GifEntry, LedgerClient, ProgramBinding, RpcLedger};
pub use session::{SessionStatus, WalletSession};
pub use view::PortalView;
pub use wallet::{KeypairWallet, WalletProvider};
