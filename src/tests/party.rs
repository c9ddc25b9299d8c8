//! Party choreography and the LOD broadcast delivery sets.

use std::time::Duration;

use aden_network::PacketClass;
use aden_protocol::packets::c2s::{
    RequestAnswerJoinParty, RequestJoinParty, RequestWithdrawalParty,
};
use aden_protocol::packets::s2c::SystemMessage;
use aden_protocol::op;
use aden_world::LodLevel;

use crate::router::BroadcastRouter;
use crate::tests::util::Harness;

#[tokio::test]
async fn party_invite_accept_and_disband() {
    let harness = Harness::boot().await;
    harness.seed_character("accta", "Leader", 0, 0, 0);
    harness.seed_character("acctb", "Member", 20, 20, 0);

    let mut leader = harness.enter_world("accta").await;
    let mut member = harness.enter_world("acctb").await;

    leader
        .send(&RequestJoinParty {
            name: "Member".into(),
            loot_rule: 0,
        })
        .await
        .unwrap();

    member.recv_until(op::s2c::ASK_JOIN_PARTY).await.unwrap();

    member
        .send(&RequestAnswerJoinParty { response: 1 })
        .await
        .unwrap();

    member.recv_until(op::s2c::JOIN_PARTY).await.unwrap();
    member
        .recv_until(op::s2c::PARTY_SMALL_WINDOW_ALL)
        .await
        .unwrap();

    leader
        .recv_until(op::s2c::PARTY_SMALL_WINDOW_ADD)
        .await
        .unwrap();

    assert_eq!(harness.server.parties().count(), 1);

    let leader_id = harness.object_id_of("Leader");
    let member_id = harness.object_id_of("Member");
    let leader_player = harness.server.world().get_player(leader_id).unwrap();
    let member_player = harness.server.world().get_player(member_id).unwrap();

    let party_id = leader_player.party_id().expect("leader in party");
    assert_eq!(member_player.party_id(), Some(party_id));

    // Two members: one leaving disbands the party.
    member.send(&RequestWithdrawalParty {}).await.unwrap();

    member
        .recv_until(op::s2c::PARTY_SMALL_WINDOW_DELETE_ALL)
        .await
        .unwrap();
    leader
        .recv_until(op::s2c::PARTY_SMALL_WINDOW_DELETE_ALL)
        .await
        .unwrap();

    assert_eq!(harness.server.parties().count(), 0);
    assert_eq!(leader_player.party_id(), None);
    assert_eq!(member_player.party_id(), None);
}

#[tokio::test]
async fn decline_keeps_everyone_partyless() {
    let harness = Harness::boot().await;
    harness.seed_character("accta", "Leader", 0, 0, 0);
    harness.seed_character("acctb", "Member", 20, 20, 0);

    let mut leader = harness.enter_world("accta").await;
    let mut member = harness.enter_world("acctb").await;

    leader
        .send(&RequestJoinParty {
            name: "Member".into(),
            loot_rule: 0,
        })
        .await
        .unwrap();
    member.recv_until(op::s2c::ASK_JOIN_PARTY).await.unwrap();

    member
        .send(&RequestAnswerJoinParty { response: 0 })
        .await
        .unwrap();

    // The inviter learns about the refusal.
    leader.recv_until(op::s2c::JOIN_PARTY).await.unwrap();

    assert_eq!(harness.server.parties().count(), 0);

    // The invite slot is free again for the next offer.
    leader
        .send(&RequestJoinParty {
            name: "Member".into(),
            loot_rule: 0,
        })
        .await
        .unwrap();
    member.recv_until(op::s2c::ASK_JOIN_PARTY).await.unwrap();
}

#[tokio::test]
async fn lod_broadcast_delivery_sets() {
    let harness = Harness::boot().await;

    const CELL: i32 = 1 << 12;
    harness.seed_character("accta", "Source", 0, 0, 0);
    harness.seed_character("acctb", "SameCell", 80, 80, 0);
    harness.seed_character("acctc", "NextCell", CELL + 10, 0, 0);

    let _source = harness.enter_world("accta").await;
    let mut same_cell = harness.enter_world("acctb").await;
    let mut next_cell = harness.enter_world("acctc").await;

    harness.server.visibility().refresh_once();

    let source_id = harness.object_id_of("Source");
    let same_id = harness.object_id_of("SameCell");
    let next_id = harness.object_id_of("NextCell");

    let mut observers = harness.server.visibility().observers_of(source_id);
    observers.sort_unstable();
    let mut expected = vec![same_id, next_id];
    expected.sort_unstable();
    assert_eq!(observers, expected);

    let body = BroadcastRouter::encode(&SystemMessage::plain(1)).unwrap();

    // Near: same cell only.
    let delivered = harness.server.router().broadcast_to_visible(
        source_id,
        LodLevel::Near,
        &body,
        PacketClass::Gameplay,
    );
    assert_eq!(delivered, 1);

    same_cell.recv_until(op::s2c::SYSTEM_MESSAGE).await.unwrap();
    next_cell
        .expect_silence(Duration::from_millis(200))
        .await
        .unwrap();

    // Medium: cell plus edge-adjacent.
    let delivered = harness.server.router().broadcast_to_visible(
        source_id,
        LodLevel::Medium,
        &body,
        PacketClass::Gameplay,
    );
    assert_eq!(delivered, 2);

    same_cell.recv_until(op::s2c::SYSTEM_MESSAGE).await.unwrap();
    next_cell.recv_until(op::s2c::SYSTEM_MESSAGE).await.unwrap();

    // All: the whole 3×3 block.
    let delivered = harness.server.router().broadcast_to_visible(
        source_id,
        LodLevel::All,
        &body,
        PacketClass::Gameplay,
    );
    assert_eq!(delivered, 2);
}

#[tokio::test]
async fn broadcast_from_position_reaches_region_locals() {
    let harness = Harness::boot().await;

    const CELL: i32 = 1 << 12;
    harness.seed_character("accta", "Close", 100, 100, 0);
    harness.seed_character("acctb", "Far", 10 * CELL, 10 * CELL, 0);

    let mut close = harness.enter_world("accta").await;
    let mut far = harness.enter_world("acctb").await;

    let body = BroadcastRouter::encode(&SystemMessage::plain(2)).unwrap();

    let delivered =
        harness
            .server
            .router()
            .broadcast_from_position(0, 0, &body, PacketClass::Gameplay);
    assert_eq!(delivered, 1);

    close.recv_until(op::s2c::SYSTEM_MESSAGE).await.unwrap();
    far.expect_silence(Duration::from_millis(200))
        .await
        .unwrap();
}
