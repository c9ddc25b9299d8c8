//! Handshake, session handoff, spawn sequence and the exit paths.

use std::time::Duration;

use aden_protocol::packets::c2s::chat::channel;
use aden_protocol::packets::c2s::{AuthLogin, CharacterSelect, EnterWorld, Logout, RequestRestart, Say};
use aden_protocol::packets::s2c::CharSelectionInfo;
use aden_protocol::{op, SessionKey};

use crate::tests::util::Harness;
use crate::testing::TestClient;

#[tokio::test]
async fn protocol_handshake_and_early_opcode_discard() {
    let harness = Harness::boot().await;
    harness.seed_character("acct1", "Fira", 0, 0, 0);

    let mut client = TestClient::connect(harness.addr).await.unwrap();

    let init = client.handshake().await.unwrap();
    assert_eq!(init.protocol_ok, 1);
    assert_ne!(init.key, [0u8; 8]);

    // A gameplay opcode in CONNECTED is discarded without closing or
    // changing state.
    client
        .send(&Say {
            text: "too early".into(),
            channel: channel::ALL,
            target: None,
        })
        .await
        .unwrap();

    client
        .expect_silence(Duration::from_millis(200))
        .await
        .unwrap();

    // The connection still authenticates normally afterwards.
    let key = harness.mint_session("acct1");
    client
        .send(&AuthLogin {
            account: "acct1".into(),
            keys: key,
        })
        .await
        .unwrap();

    client
        .expect_opcode(op::s2c::CHAR_SELECTION_INFO)
        .await
        .unwrap();
}

#[tokio::test]
async fn session_handoff_and_single_use() {
    let harness = Harness::boot().await;
    harness.seed_character("acct1", "Fira", 0, 0, 0);
    harness.seed_character("acct1", "Alt", 0, 0, 0);

    let key = SessionKey::new(0x12345678, -0x6543_2110, 0x11111111, 0x22222222);
    harness.sessions.store("acct1", key).unwrap();

    let mut client = TestClient::connect(harness.addr).await.unwrap();
    client.handshake().await.unwrap();
    client
        .send(&AuthLogin {
            account: "acct1".into(),
            keys: key,
        })
        .await
        .unwrap();

    let mut frame = client
        .expect_opcode(op::s2c::CHAR_SELECTION_INFO)
        .await
        .unwrap();

    let info: CharSelectionInfo = frame.decode().unwrap();
    assert_eq!(info.chars.len(), 2, "one entry per repository character");

    // The key was consumed: a second AuthLogin with the same tuple is
    // refused and the offending connection closes.
    let mut second = TestClient::connect(harness.addr).await.unwrap();
    second.handshake().await.unwrap();
    second
        .send(&AuthLogin {
            account: "acct1".into(),
            keys: key,
        })
        .await
        .unwrap();

    second
        .expect_opcode(op::s2c::AUTH_LOGIN_FAIL)
        .await
        .unwrap();
    assert!(second.closed_by_peer().await);
}

#[tokio::test]
async fn auth_fails_on_any_mismatched_field() {
    let harness = Harness::boot().await;
    harness.seed_character("acct1", "Fira", 0, 0, 0);

    let key = harness.mint_session("acct1");
    let mut wrong = key;
    wrong.play_ok2 ^= 1;

    let mut client = TestClient::connect(harness.addr).await.unwrap();
    client.handshake().await.unwrap();
    client
        .send(&AuthLogin {
            account: "acct1".into(),
            keys: wrong,
        })
        .await
        .unwrap();

    client
        .expect_opcode(op::s2c::AUTH_LOGIN_FAIL)
        .await
        .unwrap();
    assert!(client.closed_by_peer().await);

    // The mismatch left the stored key intact.
    assert_eq!(harness.sessions.pending_keys(), 1);
}

#[tokio::test]
async fn spawn_sequence_in_order() {
    let harness = Harness::boot().await;
    harness.seed_character("acct1", "Fira", 100, 200, -300);

    let mut client = harness.authenticated_client("acct1").await;

    client.send(&CharacterSelect { slot: 0 }).await.unwrap();
    client.expect_opcode(op::s2c::CHAR_SELECTED).await.unwrap();

    client.send(&EnterWorld {}).await.unwrap();

    for expected in [
        op::s2c::USER_INFO,
        op::s2c::STATUS_UPDATE,
        op::s2c::INVENTORY_ITEM_LIST,
        op::s2c::SHORTCUT_INIT,
        op::s2c::SKILL_LIST,
        op::s2c::QUEST_LIST,
    ] {
        client.expect_opcode(expected).await.unwrap();
    }

    let oid = harness.object_id_of("Fira");
    assert!(harness.server.world().contains(oid));
    assert!(harness.server.visibility().is_registered(oid));
}

#[tokio::test]
async fn gameplay_opcodes_are_gated_until_in_game() {
    let harness = Harness::boot().await;
    harness.seed_character("acct1", "Fira", 0, 0, 0);

    let mut client = harness.authenticated_client("acct1").await;

    // MoveToLocation is IN_GAME-only: discarded in AUTHENTICATED, the
    // handler never runs, the connection survives.
    client
        .send(&aden_protocol::packets::c2s::MoveToLocation {
            tx: 100,
            ty: 100,
            tz: 0,
            ox: 0,
            oy: 0,
            oz: 0,
            move_mode: 1,
        })
        .await
        .unwrap();

    client
        .expect_silence(Duration::from_millis(200))
        .await
        .unwrap();

    client.send(&CharacterSelect { slot: 0 }).await.unwrap();
    client.expect_opcode(op::s2c::CHAR_SELECTED).await.unwrap();
}

#[tokio::test]
async fn restart_returns_to_character_selection() {
    let harness = Harness::boot().await;
    let char_id = harness.seed_character("acct1", "Fira", 0, 0, 0);

    let mut client = harness.enter_world("acct1").await;
    let oid = harness.object_id_of("Fira");

    client.send(&RequestRestart {}).await.unwrap();

    client
        .expect_opcode(op::s2c::RESTART_RESPONSE)
        .await
        .unwrap();
    client
        .expect_opcode(op::s2c::CHAR_SELECTION_INFO)
        .await
        .unwrap();

    assert!(!harness.server.world().contains(oid));
    assert!(harness.server.registry().get_by_player_name("Fira").is_none());
    assert!(harness.persister.save_count(char_id) >= 1);

    // The session survives: picking a character again works.
    client.send(&CharacterSelect { slot: 0 }).await.unwrap();
    client.expect_opcode(op::s2c::CHAR_SELECTED).await.unwrap();
}

#[tokio::test]
async fn logout_persists_despawns_and_closes() {
    let harness = Harness::boot().await;
    let char_id = harness.seed_character("acct1", "Fira", 0, 0, 0);

    let mut client = harness.enter_world("acct1").await;
    let oid = harness.object_id_of("Fira");

    client.send(&Logout {}).await.unwrap();
    client.expect_opcode(op::s2c::LEAVE_WORLD).await.unwrap();
    assert!(client.closed_by_peer().await);

    // Disconnect cleanup is synchronous with the connection task; give
    // it a moment to run.
    tokio::time::timeout(Duration::from_secs(2), async {
        while harness.server.registry().get_by_account("acct1").is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("account never unregistered");

    assert!(!harness.server.world().contains(oid));
    assert!(harness.persister.save_count(char_id) >= 1);
    assert!(!harness.sessions.is_in_game("acct1"));
}

#[tokio::test]
async fn reconnect_displaces_the_older_connection() {
    let harness = Harness::boot().await;
    harness.seed_character("acct1", "Fira", 0, 0, 0);

    let mut first = harness.enter_world("acct1").await;

    // The login server clears presence before minting a fresh key for
    // the reconnect attempt.
    harness.sessions.mark_logout("acct1");

    let mut second = harness.authenticated_client("acct1").await;

    // The displaced connection observes the close.
    assert!(first.closed_by_peer().await);

    // And the account now belongs to the new connection.
    let conn = harness.server.registry().get_by_account("acct1").unwrap();
    assert!(!conn.is_closed());

    second.send(&CharacterSelect { slot: 0 }).await.unwrap();
    second.expect_opcode(op::s2c::CHAR_SELECTED).await.unwrap();
}
