//! GIF program interface
//!
//! - **codec**: Anchor discriminators and the Borsh account/instruction layout
//! - **ledger**: the RPC seam (`LedgerClient`) and its JSON-RPC implementation
//! - **binding**: per-call `ProgramBinding` derived from the wallet session

pub mod binding;
pub mod codec;
pub mod ledger;

pub use binding::{Deployment, ProgramBinding};
pub use codec::{BaseAccount, GifEntry};
pub use ledger::{LedgerClient, RpcLedger};
