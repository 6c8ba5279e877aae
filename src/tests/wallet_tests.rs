//! Keypair loading and keypair-backed wallet tests

use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use std::io::Write;

use crate::wallet::{
    keypair_from_base58, load_keypair, ConnectOptions, KeypairWallet, WalletError, WalletProvider,
};

fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_cli_json_keypair() {
    let keypair = Keypair::new();
    let json = serde_json::to_vec(&keypair.to_bytes().to_vec()).unwrap();
    let file = write_temp(&json);

    let loaded = load_keypair(file.path()).unwrap();
    assert_eq!(loaded.pubkey(), keypair.pubkey());
}

#[test]
fn test_load_raw_keypair_bytes() {
    let keypair = Keypair::new();
    let file = write_temp(&keypair.to_bytes());

    let loaded = load_keypair(file.path()).unwrap();
    assert_eq!(loaded.pubkey(), keypair.pubkey());
}

#[test]
fn test_load_web3_export() {
    let keypair = Keypair::new();
    let secret: serde_json::Map<String, serde_json::Value> = keypair
        .to_bytes()
        .iter()
        .enumerate()
        .map(|(i, b)| (i.to_string(), serde_json::Value::from(*b)))
        .collect();
    let export = serde_json::json!({
        "_keypair": {
            "publicKey": {},
            "secretKey": secret,
        }
    });
    let file = write_temp(export.to_string().as_bytes());

    let loaded = load_keypair(file.path()).unwrap();
    assert_eq!(loaded.pubkey(), keypair.pubkey());
}

#[test]
fn test_reject_all_zero_key() {
    let json = serde_json::to_vec(&vec![0u8; 64]).unwrap();
    let file = write_temp(&json);
    assert!(load_keypair(file.path()).is_err());
}

#[test]
fn test_reject_wrong_length() {
    let json = serde_json::to_vec(&vec![7u8; 32]).unwrap();
    let file = write_temp(&json);
    let err = load_keypair(file.path()).unwrap_err();
    assert!(err.to_string().contains("expected 64 bytes"));
}

#[test]
fn test_base58_secret() {
    let keypair = Keypair::new();
    let encoded = bs58::encode(keypair.to_bytes()).into_string();
    assert_eq!(keypair_from_base58(&encoded).unwrap().pubkey(), keypair.pubkey());
    assert!(keypair_from_base58("not-base58-0OIl").is_err());
}

#[tokio::test]
async fn test_keypair_wallet_trust() {
    let wallet = KeypairWallet::from_keypair(Keypair::new(), false);
    assert_eq!(
        wallet.connect(ConnectOptions::trusted_only()).await,
        Err(WalletError::NotTrusted)
    );
    assert_eq!(wallet.connect(ConnectOptions::prompt()).await, Ok(wallet.pubkey()));

    let trusted = KeypairWallet::from_keypair(Keypair::new(), true);
    assert_eq!(
        trusted.connect(ConnectOptions::trusted_only()).await,
        Ok(trusted.pubkey())
    );
}

#[tokio::test]
async fn test_keypair_wallet_signs_only_when_connected() {
    let wallet = KeypairWallet::from_keypair(Keypair::new(), false);
    let payer = wallet.pubkey();
    let ix = Instruction::new_with_bytes(
        Pubkey::new_unique(),
        &[1, 2, 3],
        vec![AccountMeta::new(payer, true)],
    );
    let mut tx = Transaction::new_unsigned(Message::new(&[ix], Some(&payer)));
    tx.message.recent_blockhash = Hash::new_unique();

    assert_eq!(
        wallet.sign_transaction(&mut tx).await,
        Err(WalletError::NotConnected)
    );

    wallet.connect(ConnectOptions::prompt()).await.unwrap();
    wallet.sign_transaction(&mut tx).await.unwrap();
    assert!(tx.verify().is_ok());
}
