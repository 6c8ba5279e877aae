//! End-to-end portal flows against the in-memory ledger

use std::sync::Arc;

use gif_portal::test_utils::TestCluster;
use gif_portal::{
    AccountStatus, GifEntry, GifPortal, ListState, PortalError, PortalView, SessionStatus,
};

#[tokio::test]
async fn test_missing_wallet_stays_disconnected() {
    let cluster = TestCluster::new(true);
    let mut portal = GifPortal::new(cluster.deployment.clone(), None);

    portal.start().await.unwrap();
    assert_eq!(portal.view(), PortalView::Disconnected);

    assert_eq!(portal.connect().await, Err(PortalError::WalletUnavailable));
    assert_eq!(portal.session().status(), SessionStatus::Unavailable);

    assert_eq!(
        portal.submit_entry("https://x", "Ann").await,
        Err(PortalError::NoSession)
    );
    assert_eq!(cluster.ledger.send_count(), 0);
    assert_eq!(cluster.ledger.read_count(), 0);
    assert_eq!(portal.view(), PortalView::Disconnected);
}

#[tokio::test]
async fn test_first_visit_initializes_then_submits() {
    let cluster = TestCluster::new(false);
    let mut portal = GifPortal::new(cluster.deployment.clone(), Some(cluster.wallet_provider()));

    // Untrusted wallet: no silent connection
    portal.start().await.unwrap();
    assert_eq!(portal.view(), PortalView::Disconnected);

    portal.connect().await.unwrap();
    assert_eq!(portal.account_status(), AccountStatus::Absent);
    assert_eq!(portal.view(), PortalView::NeedsInitialization);

    let result = portal.submit_entry("https://x", "Ann").await;
    assert!(matches!(result, Err(PortalError::AccountAbsent { .. })));
    assert_eq!(portal.list_state(), &ListState::Uninitialized);

    portal.initialize_account().await.unwrap();
    assert_eq!(portal.account_status(), AccountStatus::Present);
    assert_eq!(
        portal.view(),
        PortalView::Gallery { entries: vec![], total: 0 }
    );

    portal.submit_entry("https://x", "Ann").await.unwrap();
    assert_eq!(
        portal.view(),
        PortalView::Gallery {
            entries: vec![GifEntry::new("https://x", "Ann")],
            total: 1,
        }
    );

    // A second initialization is never sent
    assert!(matches!(
        portal.initialize_account().await,
        Err(PortalError::InvalidAccountState { status: AccountStatus::Present })
    ));
}

#[tokio::test]
async fn test_trusted_wallet_loads_list_at_startup() {
    let cluster = TestCluster::new(true);
    let entries = vec![
        GifEntry::new("https://a", "Ann"),
        GifEntry::new("https://b", "Bo"),
    ];
    cluster.ledger.seed_base_account(cluster.data_account(), entries.clone()).await;
    let mut portal = GifPortal::new(cluster.deployment.clone(), Some(cluster.wallet_provider()));

    portal.start().await.unwrap();

    assert_eq!(portal.session().public_identity(), Some(cluster.wallet.pubkey()));
    assert_eq!(portal.view(), PortalView::Gallery { entries, total: 2 });
}

#[tokio::test]
async fn test_two_clients_share_one_list() {
    let cluster = TestCluster::new(true);
    cluster.ledger.seed_base_account(cluster.data_account(), vec![]).await;

    let mut alice = GifPortal::new(cluster.deployment.clone(), Some(cluster.wallet_provider()));
    let other = TestCluster::new(true);
    let mut bob = GifPortal::new(cluster.deployment.clone(), Some(other.wallet_provider()));
    alice.start().await.unwrap();
    bob.start().await.unwrap();

    alice.submit_entry("https://a", "Alice").await.unwrap();
    bob.submit_entry("https://b", "Bob").await.unwrap();
    alice.refresh().await.unwrap();

    let expected = vec![
        GifEntry::new("https://a", "Alice"),
        GifEntry::new("https://b", "Bob"),
    ];
    assert_eq!(alice.list_state(), &ListState::Loaded(expected.clone()));
    assert_eq!(bob.list_state(), &ListState::Loaded(expected));
}

#[tokio::test]
async fn test_portal_shared_across_tasks_serializes_submissions() {
    let cluster = TestCluster::new(true);
    cluster.ledger.seed_base_account(cluster.data_account(), vec![]).await;
    let mut portal = GifPortal::new(cluster.deployment.clone(), Some(cluster.wallet_provider()));
    portal.start().await.unwrap();
    let portal = Arc::new(tokio::sync::Mutex::new(portal));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let portal = Arc::clone(&portal);
            tokio::spawn(async move {
                let mut portal = portal.lock().await;
                portal
                    .submit_entry(&format!("https://gif/{}", i), &format!("user{}", i))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let portal = portal.lock().await;
    match portal.list_state() {
        ListState::Loaded(entries) => assert_eq!(entries.len(), 4),
        other => panic!("unexpected list state: {:?}", other),
    }
    assert_eq!(cluster.ledger.send_count(), 4);
}

#[tokio::test]
async fn test_view_renders_each_presentation() {
    assert_eq!(PortalView::Disconnected.render(), vec!["[ Connect to Wallet ]"]);
    assert!(PortalView::NeedsInitialization.render()[0].contains("One-Time Initialization"));

    let gallery = PortalView::Gallery {
        entries: vec![GifEntry::new("https://x", "Ann")],
        total: 1,
    };
    let lines = gallery.render();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("https://x"));
    assert!(lines[1].contains("submitted by Ann"));
}

#[tokio::test]
async fn test_refresh_after_failed_start_allows_initialization() {
    let cluster = TestCluster::new(true);
    let mut portal = GifPortal::new(cluster.deployment.clone(), Some(cluster.wallet_provider()));

    cluster.ledger.fail_reads(Some("connection refused")).await;
    assert_eq!(
        portal.start().await,
        Err(PortalError::Rpc("connection refused".into()))
    );
    assert_eq!(portal.account_status(), AccountStatus::Unknown);
    cluster.ledger.fail_reads(None).await;

    portal.refresh().await.unwrap();
    assert_eq!(portal.view(), PortalView::NeedsInitialization);
    assert_eq!(portal.account_status(), AccountStatus::Absent);

    portal.initialize_account().await.unwrap();
    assert_eq!(portal.account_status(), AccountStatus::Present);
    assert_eq!(portal.view(), PortalView::Gallery { entries: vec![], total: 0 });
}

#[tokio::test]
async fn test_submit_after_failed_start_reports_missing_account() {
    let cluster = TestCluster::new(true);
    let mut portal = GifPortal::new(cluster.deployment.clone(), Some(cluster.wallet_provider()));

    cluster.ledger.fail_reads(Some("connection refused")).await;
    assert!(portal.start().await.is_err());
    cluster.ledger.fail_reads(None).await;

    let result = portal.submit_entry("https://x", "Ann").await;

    assert_eq!(
        result,
        Err(PortalError::AccountAbsent { account: cluster.data_account().to_string() })
    );
    assert_eq!(portal.list_state(), &ListState::Uninitialized);
    assert_eq!(portal.account_status(), AccountStatus::Absent);
    assert_eq!(portal.view(), PortalView::NeedsInitialization);

    portal.initialize_account().await.unwrap();
    portal.submit_entry("https://x", "Ann").await.unwrap();
    assert_eq!(
        portal.list_state(),
        &ListState::Loaded(vec![GifEntry::new("https://x", "Ann")])
    );
}

#[tokio::test]
async fn test_refresh_notices_account_created_by_another_client() {
    let cluster = TestCluster::new(true);
    let mut portal = GifPortal::new(cluster.deployment.clone(), Some(cluster.wallet_provider()));
    portal.start().await.unwrap();
    assert_eq!(portal.account_status(), AccountStatus::Absent);

    cluster
        .ledger
        .seed_base_account(cluster.data_account(), vec![GifEntry::new("https://a", "Ann")])
        .await;
    portal.refresh().await.unwrap();

    assert_eq!(portal.account_status(), AccountStatus::Present);
    assert!(matches!(
        portal.initialize_account().await,
        Err(PortalError::InvalidAccountState { status: AccountStatus::Present })
    ));
}
