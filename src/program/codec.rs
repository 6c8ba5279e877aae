//! Anchor wire format for the GIF program
//!
//! Accounts are `discriminator(8) || borsh(value) || unused space`.
//! Instructions are `discriminator(8) || borsh(args)`.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{PortalError, PortalResult};

pub const DISCRIMINATOR_LEN: usize = 8;

/// Space the program allocates for the base account
pub const BASE_ACCOUNT_SPACE: usize = 9000;

pub const START_STUFF_OFF: &str = "start_stuff_off";
pub const ADD_GIF: &str = "add_gif";

/// One appended record in the shared list
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct GifEntry {
    pub link: String,
    pub submitter_name: String,
}

impl GifEntry {
    pub fn new(link: impl Into<String>, submitter_name: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            submitter_name: submitter_name.into(),
        }
    }
}

/// Decoded state of the shared data account
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BaseAccount {
    pub total_gifs: u64,
    pub gif_list: Vec<GifEntry>,
}

/// Arguments of `add_gif`
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct AddGifArgs {
    pub gif_link: String,
    pub user_name: String,
}

fn discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(format!("{}:{}", namespace, name).as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    discriminator("account", name)
}

pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    discriminator("global", name)
}

impl BaseAccount {
    pub fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        account_discriminator("BaseAccount")
    }

    /// Decode account data, ignoring unused trailing space
    pub fn decode(data: &[u8]) -> PortalResult<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(PortalError::DecodeFailed(format!(
                "account data too short: {} bytes",
                data.len()
            )));
        }
        let (tag, mut body) = data.split_at(DISCRIMINATOR_LEN);
        if tag != Self::discriminator() {
            return Err(PortalError::DecodeFailed(
                "account discriminator mismatch".to_string(),
            ));
        }
        BaseAccount::deserialize(&mut body).map_err(|e| PortalError::DecodeFailed(e.to_string()))
    }

    /// Encode into a zero-padded buffer of `space` bytes
    pub fn encode(&self, space: usize) -> PortalResult<Vec<u8>> {
        let mut data = Self::discriminator().to_vec();
        self.serialize(&mut data)
            .map_err(|e| PortalError::DecodeFailed(e.to_string()))?;
        if data.len() > space {
            return Err(PortalError::DecodeFailed(format!(
                "encoded account needs {} bytes, only {} allocated",
                data.len(),
                space
            )));
        }
        data.resize(space, 0);
        Ok(data)
    }
}

pub fn start_stuff_off_data() -> Vec<u8> {
    instruction_discriminator(START_STUFF_OFF).to_vec()
}

pub fn add_gif_data(link: &str, name: &str) -> Vec<u8> {
    let mut data = instruction_discriminator(ADD_GIF).to_vec();
    let args = AddGifArgs {
        gif_link: link.to_string(),
        user_name: name.to_string(),
    };
    // Writing into a Vec cannot fail
    args.serialize(&mut data).ok();
    data
}
