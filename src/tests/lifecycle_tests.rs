//! Base account lifecycle tests

use crate::errors::PortalError;
use crate::lifecycle::{AccountLifecycle, AccountStatus};
use crate::list_sync::{ListState, ListSyncEngine};
use crate::program::{GifEntry, ProgramBinding};
use crate::session::SessionManager;
use crate::test_utils::TestCluster;

async fn connected(cluster: &TestCluster) -> SessionManager {
    let mut sessions = SessionManager::new(Some(cluster.wallet_provider()));
    sessions.connect().await.unwrap();
    sessions
}

#[tokio::test]
async fn test_probe_fresh_account_is_absent() {
    let cluster = TestCluster::new(true);
    let sessions = connected(&cluster).await;
    let binding = ProgramBinding::derive(&sessions, &cluster.deployment).unwrap();
    let mut lifecycle = AccountLifecycle::new();
    let mut list = ListSyncEngine::new();

    let status = lifecycle.probe(&binding, &mut list).await.unwrap();

    assert_eq!(status, AccountStatus::Absent);
    assert_eq!(list.state(), &ListState::Uninitialized);
}

#[tokio::test]
async fn test_initialize_then_probe_is_present_and_empty() {
    let cluster = TestCluster::new(true);
    let sessions = connected(&cluster).await;
    let binding = ProgramBinding::derive(&sessions, &cluster.deployment).unwrap();
    let mut lifecycle = AccountLifecycle::new();
    let mut list = ListSyncEngine::new();

    lifecycle.probe(&binding, &mut list).await.unwrap();
    lifecycle.initialize(&binding, &mut list).await.unwrap();
    assert_eq!(lifecycle.status(), AccountStatus::Present);
    assert_eq!(list.state(), &ListState::Loaded(vec![]));

    let mut fresh = AccountLifecycle::new();
    let mut fresh_list = ListSyncEngine::new();
    let binding = ProgramBinding::derive(&sessions, &cluster.deployment).unwrap();
    assert_eq!(
        fresh.probe(&binding, &mut fresh_list).await.unwrap(),
        AccountStatus::Present
    );
    assert_eq!(fresh_list.state(), &ListState::Loaded(vec![]));
}

#[tokio::test]
async fn test_initialize_refused_once_present() {
    let cluster = TestCluster::new(true);
    cluster
        .ledger
        .seed_base_account(cluster.data_account(), vec![GifEntry::new("https://a", "A")])
        .await;
    let sessions = connected(&cluster).await;
    let binding = ProgramBinding::derive(&sessions, &cluster.deployment).unwrap();
    let mut lifecycle = AccountLifecycle::new();
    let mut list = ListSyncEngine::new();

    lifecycle.probe(&binding, &mut list).await.unwrap();
    let result = lifecycle.initialize(&binding, &mut list).await;

    assert_eq!(
        result,
        Err(PortalError::InvalidAccountState { status: AccountStatus::Present })
    );
    assert_eq!(cluster.ledger.send_count(), 0);
}

#[tokio::test]
async fn test_initialize_requires_probe_first() {
    let cluster = TestCluster::new(true);
    let sessions = connected(&cluster).await;
    let binding = ProgramBinding::derive(&sessions, &cluster.deployment).unwrap();
    let mut lifecycle = AccountLifecycle::new();
    let mut list = ListSyncEngine::new();

    let result = lifecycle.initialize(&binding, &mut list).await;

    assert!(matches!(
        result,
        Err(PortalError::InvalidAccountState { status: AccountStatus::Unknown })
    ));
    assert_eq!(cluster.ledger.send_count(), 0);
}

#[tokio::test]
async fn test_failed_initialize_stays_absent() {
    let cluster = TestCluster::new(true);
    let sessions = connected(&cluster).await;
    let binding = ProgramBinding::derive(&sessions, &cluster.deployment).unwrap();
    let mut lifecycle = AccountLifecycle::new();
    let mut list = ListSyncEngine::new();
    lifecycle.probe(&binding, &mut list).await.unwrap();

    cluster.ledger.fail_next_send("insufficient funds for rent").await;
    let result = lifecycle.initialize(&binding, &mut list).await;

    assert!(matches!(result, Err(PortalError::TransactionFailed { .. })));
    assert_eq!(lifecycle.status(), AccountStatus::Absent);
    assert_eq!(list.state(), &ListState::Uninitialized);

    // The user may retry
    lifecycle.initialize(&binding, &mut list).await.unwrap();
    assert_eq!(lifecycle.status(), AccountStatus::Present);
}

#[tokio::test]
async fn test_wallet_rejecting_signature_keeps_absent() {
    let cluster = TestCluster::new(true);
    let sessions = connected(&cluster).await;
    let binding = ProgramBinding::derive(&sessions, &cluster.deployment).unwrap();
    let mut lifecycle = AccountLifecycle::new();
    let mut list = ListSyncEngine::new();
    lifecycle.probe(&binding, &mut list).await.unwrap();

    cluster.wallet.reject_signing(true);
    let result = lifecycle.initialize(&binding, &mut list).await;

    assert!(matches!(result, Err(PortalError::WalletRejected(_))));
    assert_eq!(lifecycle.status(), AccountStatus::Absent);
    assert_eq!(cluster.ledger.send_count(), 0);
}

#[tokio::test]
async fn test_transport_failure_leaves_status_unknown() {
    let cluster = TestCluster::new(true);
    let sessions = connected(&cluster).await;
    let binding = ProgramBinding::derive(&sessions, &cluster.deployment).unwrap();
    let mut lifecycle = AccountLifecycle::new();
    let mut list = ListSyncEngine::new();

    cluster.ledger.fail_reads(Some("connection refused")).await;
    let result = lifecycle.probe(&binding, &mut list).await;

    assert_eq!(result, Err(PortalError::Rpc("connection refused".into())));
    assert_eq!(lifecycle.status(), AccountStatus::Unknown);
    assert_eq!(list.state(), &ListState::NotLoaded);
}

#[tokio::test]
async fn test_undecodable_account_is_absent() {
    let cluster = TestCluster::new(true);
    cluster.ledger.put_raw(cluster.data_account(), vec![0u8; 64]).await;
    let sessions = connected(&cluster).await;
    let binding = ProgramBinding::derive(&sessions, &cluster.deployment).unwrap();
    let mut lifecycle = AccountLifecycle::new();
    let mut list = ListSyncEngine::new();

    let status = lifecycle.probe(&binding, &mut list).await.unwrap();

    assert_eq!(status, AccountStatus::Absent);
    assert_eq!(list.state(), &ListState::Uninitialized);
}

#[test]
fn test_observe_follows_confirmed_reads() {
    let mut lifecycle = AccountLifecycle::new();

    lifecycle.observe(&ListState::NotLoaded);
    assert_eq!(lifecycle.status(), AccountStatus::Unknown);

    lifecycle.observe(&ListState::Uninitialized);
    assert_eq!(lifecycle.status(), AccountStatus::Absent);

    lifecycle.observe(&ListState::Loaded(vec![GifEntry::new("https://a", "A")]));
    assert_eq!(lifecycle.status(), AccountStatus::Present);

    // A later NotLoaded never erases what a read established
    lifecycle.observe(&ListState::NotLoaded);
    assert_eq!(lifecycle.status(), AccountStatus::Present);
}
