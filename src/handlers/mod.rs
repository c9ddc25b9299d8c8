//! Gameplay packet handlers and the static dispatch tables.
//!
//! A handler is a function value in a table row; each opcode is a leaf.
//! Families whose rules live outside the core (clans beyond the registry
//! contract, augmentation, manor, boards) validate preconditions and
//! reply with acknowledgement stubs.

use aden_protocol::op::c2s;
use aden_protocol::packets::s2c::{
    status, CharInfo, InventoryEntry, InventoryItemList, PartyMember, StatusAttr, StatusUpdate,
    UserInfo,
};
use aden_world::Player;

use crate::dispatch::{HandlerEntry, StateMask};

pub mod auth;
pub mod chat;
pub mod duel;
pub mod movement;
pub mod party;
pub mod pledge;
pub mod stubs;
pub mod workshop;

macro_rules! entry {
    ($entry:ident, $name:literal, $states:expr, $handler:path) => {
        static $entry: HandlerEntry = HandlerEntry {
            name: $name,
            states: $states,
            handle: |ctx| Box::pin($handler(ctx)),
        };
    };
}

const IN_GAME: StateMask = StateMask::IN_GAME;

entry!(PROTOCOL_VERSION, "ProtocolVersion", StateMask::CONNECTED, auth::protocol_version);
entry!(AUTH_LOGIN, "AuthLogin", StateMask::CONNECTED.or(StateMask::AUTHENTICATED), auth::auth_login);
entry!(CHARACTER_SELECT, "CharacterSelect", StateMask::AUTHENTICATED, auth::character_select);
entry!(ENTER_WORLD, "EnterWorld", StateMask::ENTERING, auth::enter_world);
entry!(LOGOUT, "Logout", StateMask::AUTHED_UP, auth::logout);
entry!(REQUEST_RESTART, "RequestRestart", IN_GAME, auth::request_restart);

entry!(MOVE_TO_LOCATION, "MoveToLocation", IN_GAME, movement::move_to_location);
entry!(VALIDATE_POSITION, "ValidatePosition", IN_GAME, movement::validate_position);
entry!(ACTION, "Action", IN_GAME, movement::action);
entry!(TARGET_CANCEL, "RequestTargetCancel", IN_GAME, movement::target_cancel);
entry!(USE_ITEM, "UseItem", IN_GAME, movement::use_item);
entry!(ACTION_USE, "RequestActionUse", IN_GAME, movement::action_use);
entry!(MAGIC_SKILL_USE, "RequestMagicSkillUse", IN_GAME, movement::magic_skill_use);
entry!(SOCIAL_ACTION, "RequestSocialAction", IN_GAME, movement::social_action);

entry!(SAY, "Say", IN_GAME, chat::say);
entry!(BYPASS_TO_SERVER, "RequestBypassToServer", IN_GAME, chat::bypass_to_server);
entry!(BUILD_CMD, "SendBypassBuildCmd", IN_GAME, chat::build_cmd);
entry!(SHOW_BOARD, "RequestShowBoard", IN_GAME, chat::show_board);
entry!(BBS_WRITE, "RequestBbsWrite", IN_GAME, chat::bbs_write);

entry!(JOIN_PARTY, "RequestJoinParty", IN_GAME, party::join_party);
entry!(ANSWER_JOIN_PARTY, "RequestAnswerJoinParty", IN_GAME, party::answer_join_party);
entry!(WITHDRAW_PARTY, "RequestWithdrawalParty", IN_GAME, party::withdraw_party);
entry!(OUST_PARTY_MEMBER, "RequestOustPartyMember", IN_GAME, party::oust_party_member);
entry!(CHANGE_PARTY_LEADER, "RequestChangePartyLeader", IN_GAME, party::change_party_leader);

entry!(DUEL_START, "RequestDuelStart", IN_GAME, duel::duel_start);
entry!(DUEL_ANSWER_START, "RequestDuelAnswerStart", IN_GAME, duel::duel_answer_start);
entry!(DUEL_SURRENDER, "RequestDuelSurrender", IN_GAME, duel::duel_surrender);

entry!(JOIN_PLEDGE, "RequestJoinPledge", IN_GAME, pledge::join_pledge);
entry!(ANSWER_JOIN_PLEDGE, "RequestAnswerJoinPledge", IN_GAME, pledge::answer_join_pledge);
entry!(WITHDRAW_PLEDGE, "RequestWithdrawalPledge", IN_GAME, pledge::withdraw_pledge);
entry!(OUST_PLEDGE_MEMBER, "RequestOustPledgeMember", IN_GAME, pledge::oust_pledge_member);
entry!(PLEDGE_INFO, "RequestPledgeInfo", IN_GAME, pledge::pledge_info);
entry!(PLEDGE_MEMBER_LIST, "RequestPledgeMemberList", IN_GAME, pledge::pledge_member_list);
entry!(PLEDGE_CREST, "RequestPledgeCrest", IN_GAME, pledge::pledge_crest);
entry!(SET_PLEDGE_CREST, "RequestSetPledgeCrest", IN_GAME, pledge::set_pledge_crest);
entry!(START_PLEDGE_WAR, "RequestStartPledgeWar", IN_GAME, pledge::pledge_war_action);
entry!(REPLY_START_PLEDGE_WAR, "RequestReplyStartPledgeWar", IN_GAME, pledge::pledge_war_action);
entry!(STOP_PLEDGE_WAR, "RequestStopPledgeWar", IN_GAME, pledge::pledge_war_action);
entry!(REPLY_STOP_PLEDGE_WAR, "RequestReplyStopPledgeWar", IN_GAME, pledge::pledge_war_action);
entry!(SURRENDER_PLEDGE_WAR, "RequestSurrenderPledgeWar", IN_GAME, pledge::pledge_war_action);
entry!(JOIN_ALLY, "RequestJoinAlly", IN_GAME, pledge::ally_action);
entry!(ANSWER_JOIN_ALLY, "RequestAnswerJoinAlly", IN_GAME, pledge::ally_action);
entry!(ALLY_LEAVE, "RequestAllyLeave", IN_GAME, pledge::ally_action);
entry!(ALLY_DISMISS, "RequestAllyDismiss", IN_GAME, pledge::ally_action);
entry!(DISMISS_ALLY, "RequestDismissAlly", IN_GAME, pledge::ally_action);
entry!(SET_ALLY_CREST, "RequestSetAllyCrest", IN_GAME, pledge::ally_action);
entry!(ALLY_CREST, "RequestAllyCrest", IN_GAME, pledge::ally_crest);
entry!(PLEDGE_POWER_GRADE_LIST, "RequestPledgePowerGradeList", IN_GAME, pledge::pledge_power_stub);
entry!(PLEDGE_MEMBER_POWER_INFO, "RequestPledgeMemberPowerInfo", IN_GAME, pledge::pledge_power_stub);
entry!(PLEDGE_SET_MEMBER_POWER_GRADE, "RequestPledgeSetMemberPowerGrade", IN_GAME, pledge::pledge_power_stub);
entry!(PLEDGE_MEMBER_INFO, "RequestPledgeMemberInfo", IN_GAME, pledge::pledge_power_stub);
entry!(PLEDGE_WAR_LIST, "RequestPledgeWarList", IN_GAME, pledge::pledge_power_stub);
entry!(PLEDGE_CREST_LARGE, "RequestExPledgeCrestLarge", IN_GAME, pledge::pledge_crest_large);
entry!(SET_PLEDGE_CREST_LARGE, "RequestExSetPledgeCrestLarge", IN_GAME, pledge::set_pledge_crest_large);

entry!(AUTO_SOUL_SHOT, "RequestAutoSoulShot", IN_GAME, workshop::auto_soul_shot);
entry!(ENCHANT_SKILL_INFO, "RequestExEnchantSkillInfo", IN_GAME, workshop::enchant_skill_info);
entry!(ENCHANT_SKILL, "RequestExEnchantSkill", IN_GAME, workshop::enchant_skill);
entry!(MANOR_LIST, "RequestManorList", IN_GAME, workshop::manor_list);
entry!(PROCURE_CROP_LIST, "RequestProcureCropList", IN_GAME, workshop::procure_crop_list);
entry!(SET_SEED, "RequestSetSeed", IN_GAME, workshop::set_seed);
entry!(SET_CROP, "RequestSetCrop", IN_GAME, workshop::set_crop);
entry!(SSQ_STATUS, "RequestSsqStatus", IN_GAME, workshop::ssq_status);
entry!(CONFIRM_TARGET_ITEM, "RequestConfirmTargetItem", IN_GAME, workshop::confirm_target_item);
entry!(CONFIRM_REFINER_ITEM, "RequestConfirmRefinerItem", IN_GAME, workshop::confirm_refiner_item);
entry!(CONFIRM_GEM_STONE, "RequestConfirmGemStone", IN_GAME, workshop::confirm_gem_stone);
entry!(REFINE, "RequestRefine", IN_GAME, workshop::refine);
entry!(REFINE_CANCEL, "RequestRefineCancel", IN_GAME, workshop::refine_cancel);
entry!(HENNA_EQUIP, "RequestHennaEquip", IN_GAME, workshop::henna_action);
entry!(HENNA_REMOVE, "RequestHennaRemove", IN_GAME, workshop::henna_action);
entry!(RECIPE_SHOP_MESSAGE_SET, "RequestRecipeShopMessageSet", IN_GAME, workshop::recipe_shop_message_set);
entry!(RECIPE_SHOP_LIST_SET, "RequestRecipeShopListSet", IN_GAME, workshop::recipe_shop_list_set);
entry!(RECIPE_SHOP_MANAGE_QUIT, "RequestRecipeShopManageQuit", IN_GAME, workshop::recipe_shop_manage_quit);
entry!(RECIPE_SHOP_MAKE_INFO, "RequestRecipeShopMakeInfo", IN_GAME, workshop::recipe_shop_make);
entry!(RECIPE_SHOP_MAKE_ITEM, "RequestRecipeShopMakeItem", IN_GAME, workshop::recipe_shop_make);
entry!(RECIPE_SHOP_MANAGE_PREV, "RequestRecipeShopManagePrev", IN_GAME, workshop::recipe_shop_make);

entry!(PARTY_ROOM_STUB, "PartyMatching", IN_GAME, stubs::soft_noop);
entry!(MPCC_STUB, "CommandChannel", IN_GAME, stubs::soft_noop);
entry!(OBSERVER_STUB, "ObserverMode", IN_GAME, stubs::soft_noop);
entry!(OLYMPIAD_STUB, "OlympiadMatchList", IN_GAME, stubs::soft_noop);

/// Primary opcode table.
pub fn primary_entry(opcode: u8) -> Option<&'static HandlerEntry> {
    Some(match opcode {
        c2s::PROTOCOL_VERSION => &PROTOCOL_VERSION,
        c2s::AUTH_LOGIN => &AUTH_LOGIN,
        c2s::CHARACTER_SELECT => &CHARACTER_SELECT,
        c2s::ENTER_WORLD => &ENTER_WORLD,
        c2s::LOGOUT => &LOGOUT,
        c2s::REQUEST_RESTART => &REQUEST_RESTART,
        c2s::MOVE_TO_LOCATION => &MOVE_TO_LOCATION,
        c2s::VALIDATE_POSITION => &VALIDATE_POSITION,
        c2s::ACTION => &ACTION,
        c2s::REQUEST_TARGET_CANCEL => &TARGET_CANCEL,
        c2s::USE_ITEM => &USE_ITEM,
        c2s::REQUEST_ACTION_USE => &ACTION_USE,
        c2s::REQUEST_MAGIC_SKILL_USE => &MAGIC_SKILL_USE,
        c2s::REQUEST_SOCIAL_ACTION => &SOCIAL_ACTION,
        c2s::SAY => &SAY,
        c2s::REQUEST_BYPASS_TO_SERVER => &BYPASS_TO_SERVER,
        c2s::SEND_BYPASS_BUILD_CMD => &BUILD_CMD,
        c2s::REQUEST_SHOW_BOARD => &SHOW_BOARD,
        c2s::REQUEST_BBS_WRITE => &BBS_WRITE,
        c2s::REQUEST_JOIN_PARTY => &JOIN_PARTY,
        c2s::REQUEST_ANSWER_JOIN_PARTY => &ANSWER_JOIN_PARTY,
        c2s::REQUEST_WITHDRAWAL_PARTY => &WITHDRAW_PARTY,
        c2s::REQUEST_OUST_PARTY_MEMBER => &OUST_PARTY_MEMBER,
        c2s::REQUEST_JOIN_PLEDGE => &JOIN_PLEDGE,
        c2s::REQUEST_ANSWER_JOIN_PLEDGE => &ANSWER_JOIN_PLEDGE,
        c2s::REQUEST_WITHDRAWAL_PLEDGE => &WITHDRAW_PLEDGE,
        c2s::REQUEST_OUST_PLEDGE_MEMBER => &OUST_PLEDGE_MEMBER,
        c2s::REQUEST_PLEDGE_INFO => &PLEDGE_INFO,
        c2s::REQUEST_PLEDGE_MEMBER_LIST => &PLEDGE_MEMBER_LIST,
        c2s::REQUEST_PLEDGE_CREST => &PLEDGE_CREST,
        c2s::REQUEST_SET_PLEDGE_CREST => &SET_PLEDGE_CREST,
        c2s::REQUEST_START_PLEDGE_WAR => &START_PLEDGE_WAR,
        c2s::REQUEST_REPLY_START_PLEDGE_WAR => &REPLY_START_PLEDGE_WAR,
        c2s::REQUEST_STOP_PLEDGE_WAR => &STOP_PLEDGE_WAR,
        c2s::REQUEST_REPLY_STOP_PLEDGE_WAR => &REPLY_STOP_PLEDGE_WAR,
        c2s::REQUEST_SURRENDER_PLEDGE_WAR => &SURRENDER_PLEDGE_WAR,
        c2s::REQUEST_JOIN_ALLY => &JOIN_ALLY,
        c2s::REQUEST_ANSWER_JOIN_ALLY => &ANSWER_JOIN_ALLY,
        c2s::REQUEST_ALLY_LEAVE => &ALLY_LEAVE,
        c2s::REQUEST_ALLY_DISMISS => &ALLY_DISMISS,
        c2s::REQUEST_DISMISS_ALLY => &DISMISS_ALLY,
        c2s::REQUEST_SET_ALLY_CREST => &SET_ALLY_CREST,
        c2s::REQUEST_ALLY_CREST => &ALLY_CREST,
        c2s::REQUEST_RECIPE_SHOP_MESSAGE_SET => &RECIPE_SHOP_MESSAGE_SET,
        c2s::REQUEST_RECIPE_SHOP_LIST_SET => &RECIPE_SHOP_LIST_SET,
        c2s::REQUEST_RECIPE_SHOP_MANAGE_QUIT => &RECIPE_SHOP_MANAGE_QUIT,
        c2s::REQUEST_RECIPE_SHOP_MAKE_INFO => &RECIPE_SHOP_MAKE_INFO,
        c2s::REQUEST_RECIPE_SHOP_MAKE_ITEM => &RECIPE_SHOP_MAKE_ITEM,
        c2s::REQUEST_RECIPE_SHOP_MANAGE_PREV => &RECIPE_SHOP_MANAGE_PREV,
        c2s::REQUEST_HENNA_EQUIP => &HENNA_EQUIP,
        c2s::REQUEST_HENNA_REMOVE => &HENNA_REMOVE,
        c2s::REQUEST_SSQ_STATUS => &SSQ_STATUS,
        _ => return None,
    })
}

/// Extended (0xD0) subopcode table.
pub fn ext_entry(subop: u16) -> Option<&'static HandlerEntry> {
    use c2s::ex;

    Some(match subop {
        ex::REQUEST_CHANGE_PARTY_LEADER => &CHANGE_PARTY_LEADER,
        ex::REQUEST_AUTO_SOUL_SHOT => &AUTO_SOUL_SHOT,
        ex::REQUEST_EX_ENCHANT_SKILL_INFO => &ENCHANT_SKILL_INFO,
        ex::REQUEST_EX_ENCHANT_SKILL => &ENCHANT_SKILL,
        ex::REQUEST_MANOR_LIST => &MANOR_LIST,
        ex::REQUEST_PROCURE_CROP_LIST => &PROCURE_CROP_LIST,
        ex::REQUEST_SET_SEED => &SET_SEED,
        ex::REQUEST_SET_CROP => &SET_CROP,
        ex::REQUEST_DUEL_START => &DUEL_START,
        ex::REQUEST_DUEL_ANSWER_START => &DUEL_ANSWER_START,
        ex::REQUEST_DUEL_SURRENDER => &DUEL_SURRENDER,
        ex::REQUEST_CONFIRM_TARGET_ITEM => &CONFIRM_TARGET_ITEM,
        ex::REQUEST_CONFIRM_REFINER_ITEM => &CONFIRM_REFINER_ITEM,
        ex::REQUEST_CONFIRM_GEM_STONE => &CONFIRM_GEM_STONE,
        ex::REQUEST_REFINE => &REFINE,
        ex::REQUEST_REFINE_CANCEL => &REFINE_CANCEL,
        ex::REQUEST_PLEDGE_POWER_GRADE_LIST => &PLEDGE_POWER_GRADE_LIST,
        ex::REQUEST_PLEDGE_MEMBER_POWER_INFO => &PLEDGE_MEMBER_POWER_INFO,
        ex::REQUEST_PLEDGE_SET_MEMBER_POWER_GRADE => &PLEDGE_SET_MEMBER_POWER_GRADE,
        ex::REQUEST_PLEDGE_MEMBER_INFO => &PLEDGE_MEMBER_INFO,
        ex::REQUEST_PLEDGE_WAR_LIST => &PLEDGE_WAR_LIST,
        ex::REQUEST_EX_PLEDGE_CREST_LARGE => &PLEDGE_CREST_LARGE,
        ex::REQUEST_EX_SET_PLEDGE_CREST_LARGE => &SET_PLEDGE_CREST_LARGE,
        ex::REQUEST_OUST_FROM_PARTY_ROOM
        | ex::REQUEST_DISMISS_PARTY_ROOM
        | ex::REQUEST_WITHDRAW_PARTY_ROOM
        | ex::REQUEST_ASK_JOIN_PARTY_ROOM
        | ex::ANSWER_JOIN_PARTY_ROOM
        | ex::REQUEST_LIST_PARTY_MATCHING_WAITING_ROOM
        | ex::REQUEST_EXIT_PARTY_MATCHING_WAITING_ROOM => &PARTY_ROOM_STUB,
        ex::REQUEST_EX_ASK_JOIN_MPCC
        | ex::REQUEST_EX_ACCEPT_JOIN_MPCC
        | ex::REQUEST_EX_OUST_FROM_MPCC => &MPCC_STUB,
        ex::REQUEST_OBSERVER_END | ex::REQUEST_OLYMPIAD_OBSERVER_END => &OBSERVER_STUB,
        ex::REQUEST_OLYMPIAD_MATCH_LIST => &OLYMPIAD_STUB,
        _ => return None,
    })
}

// Packet builders shared by several handler families.

pub(crate) fn user_info(player: &Player) -> UserInfo {
    let loc = player.location();
    let vitals = player.vitals();

    UserInfo {
        object_id: player.id.as_i32(),
        name: player.name.clone(),
        title: player.title.clone(),
        x: loc.x,
        y: loc.y,
        z: loc.z,
        heading: loc.heading,
        race: player.stats.race,
        sex: player.stats.sex,
        class_id: player.stats.class_id,
        level: player.stats.level,
        exp: player.stats.exp,
        sp: player.stats.sp,
        cur_hp: vitals.cur_hp,
        max_hp: vitals.max_hp,
        cur_mp: vitals.cur_mp,
        max_mp: vitals.max_mp,
        cur_cp: vitals.cur_cp,
        max_cp: vitals.max_cp,
        karma: player.stats.karma,
        pvp_flag: 0,
        clan_id: player.clan_id().map_or(0, |c| c.0 as i32),
        ally_id: 0,
        walk_speed: player.walk_speed,
        run_speed: player.run_speed,
        private_store: player.private_store().wire_value(),
    }
}

pub(crate) fn char_info(player: &Player) -> CharInfo {
    let loc = player.location();

    CharInfo {
        object_id: player.id.as_i32(),
        name: player.name.clone(),
        title: player.title.clone(),
        x: loc.x,
        y: loc.y,
        z: loc.z,
        heading: loc.heading,
        race: player.stats.race,
        sex: player.stats.sex,
        class_id: player.stats.class_id,
        level: player.stats.level,
        clan_id: player.clan_id().map_or(0, |c| c.0 as i32),
        ally_id: 0,
        pvp_flag: 0,
        karma: player.stats.karma,
        walk_speed: player.walk_speed,
        run_speed: player.run_speed,
        private_store: player.private_store().wire_value(),
    }
}

pub(crate) fn status_update_full(player: &Player) -> StatusUpdate {
    let vitals = player.vitals();

    let attrs = vec![
        StatusAttr {
            id: status::LEVEL,
            value: player.stats.level,
        },
        StatusAttr {
            id: status::CUR_HP,
            value: vitals.cur_hp,
        },
        StatusAttr {
            id: status::MAX_HP,
            value: vitals.max_hp,
        },
        StatusAttr {
            id: status::CUR_MP,
            value: vitals.cur_mp,
        },
        StatusAttr {
            id: status::MAX_MP,
            value: vitals.max_mp,
        },
        StatusAttr {
            id: status::CUR_CP,
            value: vitals.cur_cp,
        },
        StatusAttr {
            id: status::MAX_CP,
            value: vitals.max_cp,
        },
    ];

    StatusUpdate {
        object_id: player.id.as_i32(),
        attrs,
    }
}

pub(crate) fn inventory_list(player: &Player) -> InventoryItemList {
    let items = player
        .inventory()
        .into_iter()
        .map(|item| InventoryEntry {
            object_id: item.object_id.as_i32(),
            item_id: item.item_id,
            count: item.count,
            equip_slot: item.equip_slot,
            enchant_level: item.enchant_level,
        })
        .collect();

    InventoryItemList {
        open_window: 0,
        items,
    }
}

pub(crate) fn party_member_entry(player: &Player) -> PartyMember {
    let vitals = player.vitals();

    PartyMember {
        object_id: player.id.as_i32(),
        name: player.name.clone(),
        cur_hp: vitals.cur_hp,
        max_hp: vitals.max_hp,
        cur_mp: vitals.cur_mp,
        max_mp: vitals.max_mp,
        level: player.stats.level,
        class_id: player.stats.class_id,
    }
}
