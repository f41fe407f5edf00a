mod common;

use std::time::Duration;

use common::{attack_only, fighter, with_collaboration};
use engine::battle::ActionResult;
use engine::{Action, Arena, BattleConfig, BattleSession, CharacterError, Dice, Phase, Side};

fn started(player: &engine::Character, opponent: &engine::Character, cfg: BattleConfig) -> BattleSession {
    let mut s = BattleSession::new(player, opponent, cfg, Dice::from_seed(11)).unwrap();
    assert!(s.start());
    s
}

#[test]
fn waits_in_ready_until_started() {
    let p = fighter("p", 100, 100, 0, 0.0, 0.0, 20.0);
    let o = fighter("o", 200, 10, 40, 0.0, 0.0, 20.0);
    let mut s = BattleSession::new(&p, &o, BattleConfig::default(), Dice::from_seed(1)).unwrap();
    assert_eq!(s.phase(), Phase::Ready);
    assert!(s.perform_player_action(Action::Attack).is_none());
    assert_eq!(s.opponent_hp(), 200);
    assert!(s.log().is_empty());

    assert!(s.start());
    assert!(!s.start());
    assert_eq!(s.phase(), Phase::PlayerTurn);
    assert_eq!(s.log().to_vec(), vec!["Battle Start!".to_string()]);
}

#[test]
fn attack_against_heavy_defense_deals_the_floor() {
    let p = fighter("p", 100, 100, 0, 0.0, 0.0, 20.0);
    let o = fighter("o", 200, 10, 40, 0.0, 0.0, 20.0);
    let mut s = started(&p, &o, attack_only());

    let turn = s.perform_player_action(Action::Attack).unwrap();
    assert_eq!(turn.report.result, ActionResult::Hit { damage: 50, crit: false });
    assert_eq!(s.opponent_hp(), 150);
    assert_eq!(s.phase(), Phase::OpponentTurn);
    assert_eq!(s.turn_count(), 1);

    let pending = turn.pending.unwrap();
    assert_eq!(pending.delay, Duration::from_millis(700));
    assert_eq!(s.log().lines().last(), Some("You dealt 50 damage!"));
}

#[test]
fn actions_during_the_opponent_turn_change_nothing() {
    let p = fighter("p", 500, 100, 0, 0.0, 0.0, 20.0);
    let o = fighter("o", 200, 10, 40, 0.0, 0.0, 20.0);
    let mut s = started(&p, &o, attack_only());
    s.perform_player_action(Action::Attack).unwrap();

    let log_before = s.log().to_vec();
    let hp_before = (s.player_hp(), s.opponent_hp());
    assert!(s.perform_player_action(Action::Attack).is_none());
    assert!(s.perform_player_action(Action::Heal).is_none());
    assert_eq!(s.log().to_vec(), log_before);
    assert_eq!((s.player_hp(), s.opponent_hp()), hp_before);
    assert_eq!(s.turn_count(), 1);
}

#[test]
fn opponent_ticket_resolves_exactly_once() {
    let p = fighter("p", 500, 100, 0, 0.0, 0.0, 20.0);
    let o = fighter("o", 200, 10, 40, 0.0, 0.0, 20.0);
    let mut s = started(&p, &o, attack_only());
    let pending = s.perform_player_action(Action::Attack).unwrap().pending.unwrap();

    let report = s.resolve_opponent_turn(pending).unwrap();
    assert_eq!(report.actor, Side::Opponent);
    assert_eq!(report.result, ActionResult::Hit { damage: 50, crit: false });
    assert_eq!(s.player_hp(), 450);
    assert_eq!(s.phase(), Phase::PlayerTurn);

    assert!(s.resolve_opponent_turn(pending).is_none());
    assert_eq!(s.player_hp(), 450);
}

#[test]
fn cancelled_ticket_is_rejected_and_can_be_reissued() {
    let p = fighter("p", 500, 100, 0, 0.0, 0.0, 20.0);
    let o = fighter("o", 200, 10, 40, 0.0, 0.0, 20.0);
    let mut s = started(&p, &o, attack_only());
    let first = s.perform_player_action(Action::Attack).unwrap().pending.unwrap();

    assert!(s.cancel_pending());
    assert!(s.resolve_opponent_turn(first).is_none());
    assert_eq!(s.phase(), Phase::OpponentTurn);
    assert_eq!(s.player_hp(), 500);

    let second = s.schedule_opponent_turn().unwrap();
    assert_ne!(second.ticket, first.ticket);
    assert!(s.schedule_opponent_turn().is_none());
    assert!(s.resolve_opponent_turn(second).is_some());
}

#[test]
fn knockout_finishes_with_victory() {
    let p = fighter("p", 100, 5000, 0, 0.0, 0.0, 20.0);
    let o = fighter("o", 60, 10, 0, 0.0, 0.0, 20.0);
    let mut s = started(&p, &o, BattleConfig::default());

    let turn = s.perform_player_action(Action::Attack).unwrap();
    assert!(turn.pending.is_none());
    assert_eq!(s.opponent_hp(), 0);
    assert_eq!(s.phase(), Phase::Finished);
    assert_eq!(s.winner(), Some(Side::Player));
    assert_eq!(s.log().lines().last(), Some("Victory!"));

    let log = s.log().to_vec();
    assert!(s.perform_player_action(Action::Heal).is_none());
    assert_eq!(s.log().to_vec(), log);
    assert_eq!(s.winner(), Some(Side::Player));
}

#[test]
fn opponent_knockout_is_a_defeat() {
    let p = fighter("p", 40, 100, 0, 100.0, 0.0, 20.0);
    let o = fighter("o", 200, 1000, 0, 0.0, 0.0, 20.0);
    let mut s = started(&p, &o, attack_only());

    let turn = s.perform_player_action(Action::Attack).unwrap();
    assert_eq!(turn.report.result, ActionResult::Missed);
    let report = s.resolve_opponent_turn(turn.pending.unwrap()).unwrap();
    assert_eq!(report.player_hp, 0);
    assert_eq!(s.winner(), Some(Side::Opponent));
    assert_eq!(s.phase(), Phase::Finished);
    assert_eq!(s.log().lines().last(), Some("Defeat..."));
}

#[test]
fn heal_at_full_hp_restores_nothing() {
    let p = fighter("p", 100, 100, 0, 0.0, 0.0, 30.0);
    let o = fighter("o", 200, 10, 40, 0.0, 0.0, 20.0);
    let mut s = started(&p, &o, attack_only());

    let turn = s.perform_player_action(Action::Heal).unwrap();
    assert_eq!(turn.report.result, ActionResult::Healed { amount: 0 });
    assert_eq!(s.player_hp(), 100);
    assert_eq!(s.log().lines().last(), Some("You healed 0 HP!"));
}

#[test]
fn heal_recovers_up_to_max() {
    let p = fighter("p", 100, 100, 0, 0.0, 0.0, 30.0);
    let o = fighter("o", 200, 10, 40, 0.0, 0.0, 20.0);
    let mut s = started(&p, &o, attack_only());

    let pending = s.perform_player_action(Action::Attack).unwrap().pending.unwrap();
    s.resolve_opponent_turn(pending).unwrap();
    assert_eq!(s.player_hp(), 50);

    let turn = s.perform_player_action(Action::Heal).unwrap();
    assert_eq!(turn.report.result, ActionResult::Healed { amount: 30 });
    assert_eq!(s.player_hp(), 80);
    s.resolve_opponent_turn(turn.pending.unwrap()).unwrap();
    assert_eq!(s.player_hp(), 30);
}

#[test]
fn log_keeps_only_the_latest_lines() {
    let p = fighter("p", 5000, 100, 0, 0.0, 0.0, 20.0);
    let o = fighter("o", 5000, 100, 40, 0.0, 0.0, 20.0);
    let mut s = started(&p, &o, attack_only());
    for _ in 0..6 {
        let pending = s.perform_player_action(Action::Attack).unwrap().pending.unwrap();
        s.resolve_opponent_turn(pending).unwrap();
    }
    assert_eq!(s.log().len(), 4);
    assert_eq!(s.log().lines().last(), Some("Opponent dealt 100 damage!"));
    assert_eq!(s.turn_count(), 6);
    assert_eq!(s.player_hp(), 4400);
    assert_eq!(s.opponent_hp(), 4700);
}

#[test]
fn collaboration_multiplier_scales_effective_stats() {
    let p = with_collaboration(fighter("p", 101, 80, 33, 0.0, 0.0, 20.0), 1.5);
    let o = fighter("o", 200, 10, 40, 0.0, 0.0, 20.0);
    let s = BattleSession::new(&p, &o, BattleConfig::default(), Dice::from_seed(1)).unwrap();
    assert_eq!(s.player_max_hp(), 152);
    assert_eq!(s.player_hp(), 152);
    assert_eq!(s.player_stats().attack, 120);
    assert_eq!(s.player_stats().defense, 50);
    assert_eq!(s.player_stats().heal, 20.0);
}

#[test]
fn malformed_character_refuses_to_start() {
    let bad = fighter("bad", 0, 10, 0, 0.0, 0.0, 20.0);
    let o = fighter("o", 200, 10, 40, 0.0, 0.0, 20.0);
    let err = BattleSession::new(&bad, &o, BattleConfig::default(), Dice::from_seed(1))
        .err()
        .unwrap();
    assert!(matches!(err, CharacterError::NonPositive { field: "hp", .. }));

    let tiny = with_collaboration(fighter("tiny", 1, 10, 0, 0.0, 0.0, 20.0), 0.1);
    assert!(BattleSession::new(&o, &tiny, BattleConfig::default(), Dice::from_seed(1)).is_err());
}

#[test]
fn battle_with_capped_heals_terminates() {
    let p = engine::generate_character("4901005510111");
    let o = engine::generate_character("4902430625937");
    let mut s = BattleSession::new(&p, &o, BattleConfig::default(), Dice::from_seed(2025)).unwrap();
    s.start();
    let mut guard = 0;
    while s.phase() != Phase::Finished {
        guard += 1;
        assert!(guard < 200, "battle did not finish");
        if let Some(turn) = s.perform_player_action(Action::Attack) {
            if let Some(pending) = turn.pending {
                s.resolve_opponent_turn(pending);
            }
        }
    }
    assert!(s.winner().is_some());
    assert!(s.player_hp() >= 0 && s.opponent_hp() >= 0);
}

#[test]
fn arena_drops_tickets_from_a_discarded_battle() {
    let p = fighter("p", 500, 100, 0, 0.0, 0.0, 20.0);
    let o = fighter("o", 200, 10, 40, 0.0, 0.0, 20.0);
    let mut arena = Arena::new(attack_only());

    let first = arena.start_battle(&p, &o, Dice::from_seed(1)).unwrap();
    assert_eq!(first.phase(), Phase::Ready);
    first.start();
    let stale = first.perform_player_action(Action::Attack).unwrap().pending.unwrap();

    let second = arena.start_battle(&p, &o, Dice::from_seed(2)).unwrap();
    second.start();
    let second_id = second.id();
    assert_ne!(second_id, stale.session);

    assert!(arena.resolve(stale).is_none());
    let active = arena.active().unwrap();
    assert_eq!(active.player_hp(), 500);
    assert_eq!(active.phase(), Phase::PlayerTurn);

    let live = arena
        .active_mut()
        .unwrap()
        .perform_player_action(Action::Attack)
        .unwrap()
        .pending
        .unwrap();
    arena.discard();
    assert!(arena.resolve(live).is_none());
    assert!(arena.active().is_none());
}

#[test]
fn arena_keeps_the_current_battle_when_a_new_one_is_malformed() {
    let p = fighter("p", 500, 100, 0, 0.0, 0.0, 20.0);
    let o = fighter("o", 200, 10, 40, 0.0, 0.0, 20.0);
    let bad = fighter("bad", 100, 0, 0, 0.0, 0.0, 20.0);
    let mut arena = Arena::new(BattleConfig::default());
    let id = arena.start_battle(&p, &o, Dice::from_seed(1)).unwrap().id();
    assert!(arena.start_battle(&p, &bad, Dice::from_seed(1)).is_err());
    assert_eq!(arena.active().map(|s| s.id()), Some(id));
}

#[test]
fn ticket_from_one_session_is_rejected_by_another() {
    let p = fighter("p", 500, 100, 0, 0.0, 0.0, 20.0);
    let o = fighter("o", 2000, 10, 40, 0.0, 0.0, 20.0);
    let mut a = started(&p, &o, attack_only());
    let mut b = started(&p, &o, attack_only());
    assert_ne!(a.id(), b.id());

    let from_a = a.perform_player_action(Action::Attack).unwrap().pending.unwrap();
    let from_b = b.perform_player_action(Action::Attack).unwrap().pending.unwrap();
    assert_eq!(from_a.ticket, from_b.ticket);

    assert!(b.resolve_opponent_turn(from_a).is_none());
    assert_eq!(b.player_hp(), 500);
    assert_eq!(b.phase(), Phase::OpponentTurn);
    assert_eq!(b.pending_turn(), Some(from_b));

    let report = b.resolve_opponent_turn(from_b).unwrap();
    assert_eq!(report.result, ActionResult::Hit { damage: 50, crit: false });
    assert_eq!(b.player_hp(), 450);
    assert_eq!(a.player_hp(), 500);
}
