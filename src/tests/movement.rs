//! Movement validation, desync correction, targeting, chat routing.

use std::time::Duration;

use aden_protocol::packets::c2s::chat::channel;
use aden_protocol::packets::c2s::{Action, MoveToLocation, Say, ValidatePosition};
use pretty_assertions::assert_eq;

use aden_protocol::op;
use aden_protocol::packets::s2c::CreatureSay;

use crate::tests::util::Harness;

#[tokio::test]
async fn movement_validation_sweep() {
    let harness = Harness::boot().await;
    harness.seed_character("accta", "Mover", 0, 0, 0);
    harness.seed_character("acctb", "Watcher", 50, 50, 0);

    let mut mover = harness.enter_world("accta").await;
    let mut watcher = harness.enter_world("acctb").await;

    // The watcher's spawn announcement reaches the mover; drain it so
    // the assertions below see a clean stream.
    mover.recv_until(op::s2c::CHAR_INFO).await.unwrap();

    harness.server.visibility().refresh_once();

    let move_req = |tx, ty, tz| MoveToLocation {
        tx,
        ty,
        tz,
        ox: 0,
        oy: 0,
        oz: 0,
        move_mode: 1,
    };

    // Too far.
    mover.send(&move_req(20_000, 0, 0)).await.unwrap();
    mover.expect_opcode(op::s2c::ACTION_FAILED).await.unwrap();

    // Too close.
    mover.send(&move_req(1, 0, 0)).await.unwrap();
    mover.expect_opcode(op::s2c::ACTION_FAILED).await.unwrap();

    // Zero distance: accepted, echoed.
    mover.send(&move_req(0, 0, 0)).await.unwrap();
    mover
        .expect_opcode(op::s2c::MOVE_TO_LOCATION)
        .await
        .unwrap();

    // Bad z.
    mover.send(&move_req(1000, 1000, 50_000)).await.unwrap();
    mover.expect_opcode(op::s2c::ACTION_FAILED).await.unwrap();

    // Accepted: location updates and the move fans out at Near LOD.
    mover.send(&move_req(1000, 1000, 500)).await.unwrap();
    mover
        .expect_opcode(op::s2c::MOVE_TO_LOCATION)
        .await
        .unwrap();

    watcher
        .recv_until(op::s2c::MOVE_TO_LOCATION)
        .await
        .unwrap();

    let oid = harness.object_id_of("Mover");
    let loc = harness.server.world().get(oid).unwrap().location();
    assert_eq!((loc.x, loc.y, loc.z), (1000, 1000, 500));
}

#[tokio::test]
async fn desync_beyond_the_threshold_is_corrected() {
    let harness = Harness::boot().await;
    harness.seed_character("acct1", "Fira", 1000, 1000, 0);

    let mut client = harness.enter_world("acct1").await;

    // 400 units off: tolerated.
    client
        .send(&ValidatePosition {
            x: 1400,
            y: 1000,
            z: 0,
            heading: 0,
        })
        .await
        .unwrap();
    client
        .expect_silence(Duration::from_millis(200))
        .await
        .unwrap();

    // 700 units off: corrected with the authoritative position.
    client
        .send(&ValidatePosition {
            x: 1700,
            y: 1000,
            z: 0,
            heading: 0,
        })
        .await
        .unwrap();
    client
        .expect_opcode(op::s2c::VALIDATE_LOCATION)
        .await
        .unwrap();
}

#[tokio::test]
async fn target_selection_validates_before_mutating() {
    let harness = Harness::boot().await;
    harness.seed_character("accta", "Picker", 0, 0, 0);
    harness.seed_character("acctb", "Mark", 100, 0, 0);

    let mut picker = harness.enter_world("accta").await;
    let _mark = harness.enter_world("acctb").await;

    picker.recv_until(op::s2c::CHAR_INFO).await.unwrap();

    harness.server.visibility().refresh_once();

    let picker_id = harness.object_id_of("Picker");
    let mark_id = harness.object_id_of("Mark");

    // Missing object: refused, no target set.
    picker
        .send(&Action {
            object_id: 0x7FFF_FFFF,
            origin_x: 0,
            origin_y: 0,
            origin_z: 0,
            action_kind: 0,
        })
        .await
        .unwrap();
    picker.expect_opcode(op::s2c::ACTION_FAILED).await.unwrap();

    let picker_player = harness.server.world().get_player(picker_id).unwrap();
    assert_eq!(picker_player.target(), None);

    // Valid pick: target recorded, no refusal.
    picker
        .send(&Action {
            object_id: mark_id.as_i32(),
            origin_x: 0,
            origin_y: 0,
            origin_z: 0,
            action_kind: 0,
        })
        .await
        .unwrap();
    picker
        .expect_silence(Duration::from_millis(200))
        .await
        .unwrap();

    assert_eq!(picker_player.target(), Some(mark_id));
}

#[tokio::test]
async fn whispers_route_by_name_and_respect_blocks() {
    let harness = Harness::boot().await;
    harness.seed_character("accta", "Talker", 0, 0, 0);
    let listener_char = harness.seed_character("acctb", "Listener", 10, 10, 0);

    let mut talker = harness.enter_world("accta").await;
    let mut listener = harness.enter_world("acctb").await;

    talker
        .send(&Say {
            text: "psst".into(),
            channel: channel::TELL,
            target: Some("Listener".into()),
        })
        .await
        .unwrap();

    let mut frame = listener.recv_until(op::s2c::CREATURE_SAY).await.unwrap();
    let line: CreatureSay = frame.decode().unwrap();
    assert_eq!(line.name, "Talker");
    assert_eq!(line.text, "psst");

    // Unknown recipient: a system message comes back instead.
    talker
        .send(&Say {
            text: "hello?".into(),
            channel: channel::TELL,
            target: Some("Nobody".into()),
        })
        .await
        .unwrap();
    talker
        .recv_until(op::s2c::SYSTEM_MESSAGE)
        .await
        .unwrap();

    // Blocked sender: the whisper disappears silently.
    harness
        .friends
        .set_blocked(listener_char, vec!["Talker".into()]);

    talker
        .send(&Say {
            text: "still there?".into(),
            channel: channel::TELL,
            target: Some("Listener".into()),
        })
        .await
        .unwrap();

    listener
        .expect_silence(Duration::from_millis(200))
        .await
        .unwrap();
}

#[tokio::test]
async fn failing_validators_never_mutate_the_world() {
    let harness = Harness::boot().await;
    harness.seed_character("acct1", "Static", 500, 500, 0);

    let mut client = harness.enter_world("acct1").await;
    let oid = harness.object_id_of("Static");
    let before = harness.server.world().get(oid).unwrap().location();

    client
        .send(&MoveToLocation {
            tx: 500 + 25_000,
            ty: 500,
            tz: 0,
            ox: 500,
            oy: 500,
            oz: 0,
            move_mode: 1,
        })
        .await
        .unwrap();
    client.expect_opcode(op::s2c::ACTION_FAILED).await.unwrap();

    let after = harness.server.world().get(oid).unwrap().location();
    assert_eq!(before, after);

    // Region membership is untouched as well.
    assert!(harness.server.world().region_contains(before.region(), oid));
}
