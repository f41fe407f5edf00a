use engine::api::{simulate_duel, simulate_duel_many, DuelConfig};
use engine::BattleConfig;

#[test]
fn duel_with_builtin_products_runs() {
    let cfg = DuelConfig {
        player_code: Some("4901777289628".into()),
        opponent_code: Some("4902102119917".into()),
        seed: 2025,
        ..DuelConfig::default()
    };
    let res = simulate_duel(cfg).unwrap();
    assert!(res.turns > 0);
    assert_ne!(res.winner, "draw");
}

#[test]
fn duel_many_summary_makes_sense() {
    let cfg = DuelConfig {
        player_code: Some("4901005510111".into()),
        opponent_code: Some("4901313185322".into()),
        seed: 1,
        ..DuelConfig::default()
    };
    let stats = simulate_duel_many(cfg, 50).unwrap();
    assert_eq!(stats.samples, 50);
    assert_eq!(stats.player_wins + stats.opponent_wins + stats.draws, 50);
    assert!(stats.avg_turns >= 1.0);
}

#[test]
fn turn_cap_produces_a_draw() {
    // Both sides have over 80 HP and hits land for 50, so one exchange cannot end it.
    let cfg = DuelConfig {
        player_code: Some("1".into()),
        opponent_code: Some("2".into()),
        battle: Some(BattleConfig { max_turns: 1, ..BattleConfig::default() }),
        seed: 3,
        ..DuelConfig::default()
    };
    let res = simulate_duel(cfg).unwrap();
    assert_eq!(res.turns, 1);
    assert_eq!(res.winner, "draw");
}

#[test]
fn invalid_inline_config_is_rejected() {
    let cfg = DuelConfig {
        player_code: Some("1".into()),
        opponent_code: Some("2".into()),
        battle: Some(BattleConfig { crit_multiplier: 0.5, ..BattleConfig::default() }),
        ..DuelConfig::default()
    };
    assert!(simulate_duel(cfg).is_err());
}
