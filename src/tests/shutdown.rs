//! Graceful shutdown under load, and the login-driven kick path.

use std::time::Duration;

use aden_network::PacketClass;
use aden_protocol::packets::s2c::SystemMessage;

use crate::router::BroadcastRouter;
use crate::tests::util::Harness;

#[tokio::test]
async fn shutdown_under_load() {
    let harness = Harness::boot().await;

    const CLIENTS: usize = 12;
    let mut clients = Vec::with_capacity(CLIENTS);

    for n in 0..CLIENTS {
        let account = format!("acct{n}");
        harness.seed_character(&account, &format!("Char{n}"), (n as i32) * 40, 0, 0);
        clients.push(harness.enter_world(&account).await);
    }

    assert_eq!(harness.server.registry().player_count(), CLIENTS);

    // Broadcasts in flight while the server goes down.
    let body = BroadcastRouter::encode(&SystemMessage::plain(3)).unwrap();
    for _ in 0..100 {
        harness
            .server
            .router()
            .broadcast_to_all(&body, PacketClass::Gameplay);
    }

    harness.server.shutdown().await;

    // Every index is empty and every socket is closed.
    assert_eq!(harness.server.registry().client_count(), 0);
    assert_eq!(harness.server.registry().player_count(), 0);
    assert!(harness.server.world().is_empty());
    assert_eq!(harness.server.visibility().observer_count(), 0);

    for mut client in clients {
        assert!(client.closed_by_peer().await);
    }
}

#[tokio::test]
async fn kick_by_account_closes_the_client() {
    let harness = Harness::boot().await;
    harness.seed_character("acct1", "Fira", 0, 0, 0);

    let mut client = harness.enter_world("acct1").await;

    harness.server.kick_account("acct1");

    assert!(client.closed_by_peer().await);

    tokio::time::timeout(Duration::from_secs(2), async {
        while harness.server.registry().get_by_account("acct1").is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("kicked client never left the registry");

    assert!(harness.server.world().is_empty());
}
