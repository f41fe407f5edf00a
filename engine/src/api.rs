use std::fs;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::battle::{ActionReport, BattleSession, Phase, Side};
use crate::character::Character;
use crate::combat::choose_opponent_action;
use crate::config::BattleConfig;
use crate::content::Catalog;
use crate::generator::generate_character_with;
use crate::life::Health;
use crate::Dice;

/// Keeps the autopilot's draws independent of the battle's own dice.
const AUTOPILOT_SALT: u64 = 0x5EED_0F_BA77_1E;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DuelConfig {
    /// Inline record, e.g. straight from the external character service.
    #[serde(default)]
    pub player: Option<Character>,
    #[serde(default)]
    pub player_code: Option<String>,
    #[serde(default)]
    pub player_path: Option<String>,
    #[serde(default)]
    pub opponent: Option<Character>,
    #[serde(default)]
    pub opponent_code: Option<String>,
    #[serde(default)]
    pub opponent_path: Option<String>,
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default)]
    pub config_path: Option<String>,
    /// Inline tuning; ignored when `config_path` is set.
    #[serde(default)]
    pub battle: Option<BattleConfig>,
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DuelResult {
    pub winner: String,
    pub turns: u32,
    pub player_name: String,
    pub opponent_name: String,
    pub player_hp_end: i32,
    pub opponent_hp_end: i32,
    pub player_max_hp: i32,
    pub opponent_max_hp: i32,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DuelStats {
    pub samples: u32,
    pub player_wins: u32,
    pub opponent_wins: u32,
    pub draws: u32,
    pub avg_turns: f64,
}

struct Prepared {
    catalog: Catalog,
    battle: BattleConfig,
}

impl Prepared {
    fn from_config(cfg: &DuelConfig) -> Result<Self> {
        let catalog = match &cfg.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin(),
        };
        let battle = match (&cfg.config_path, &cfg.battle) {
            (Some(path), _) => BattleConfig::load(path)?,
            (None, Some(inline)) => {
                inline.validate().context("invalid inline battle config")?;
                inline.clone()
            }
            (None, None) => BattleConfig::default(),
        };
        Ok(Self { catalog, battle })
    }
}

/// Run one seeded battle to completion with both sides on the heuristic.
pub fn simulate_duel(cfg: DuelConfig) -> Result<DuelResult> {
    let prepared = Prepared::from_config(&cfg)?;
    run_duel(&cfg, &prepared, cfg.seed)
}

/// Repeat [`simulate_duel`] with seeds `seed, seed + 1, ...`.
pub fn simulate_duel_many(cfg: DuelConfig, samples: u32) -> Result<DuelStats> {
    let prepared = Prepared::from_config(&cfg)?;
    let mut stats = DuelStats {
        samples,
        player_wins: 0,
        opponent_wins: 0,
        draws: 0,
        avg_turns: 0.0,
    };
    let mut total_turns = 0u64;
    for i in 0..samples {
        let res = run_duel(&cfg, &prepared, cfg.seed.wrapping_add(u64::from(i)))?;
        match res.winner.as_str() {
            "player" => stats.player_wins += 1,
            "opponent" => stats.opponent_wins += 1,
            _ => stats.draws += 1,
        }
        total_turns += u64::from(res.turns);
    }
    if samples > 0 {
        stats.avg_turns = total_turns as f64 / f64::from(samples);
    }
    Ok(stats)
}

fn run_duel(cfg: &DuelConfig, prepared: &Prepared, seed: u64) -> Result<DuelResult> {
    let mut dice = Dice::from_seed(seed);
    let mut autopilot = Dice::from_seed(seed ^ AUTOPILOT_SALT);

    let player = load_character(
        "player",
        cfg.player.as_ref(),
        cfg.player_code.as_deref(),
        cfg.player_path.as_deref(),
        &prepared.catalog,
        &mut dice,
    )?;
    let opponent = load_character(
        "opponent",
        cfg.opponent.as_ref(),
        cfg.opponent_code.as_deref(),
        cfg.opponent_path.as_deref(),
        &prepared.catalog,
        &mut dice,
    )?;

    let mut session = BattleSession::new(&player, &opponent, prepared.battle.clone(), dice)
        .context("cannot start battle")?;
    let max_turns = prepared.battle.max_turns;
    let mut logs = Vec::new();

    logs.push(format!(
        "[START] {} (HP {}, ATK {}, DEF {}) vs {} (HP {}, ATK {}, DEF {})",
        session.player_name(),
        session.player_max_hp(),
        session.player_stats().attack,
        session.player_stats().defense,
        session.opponent_name(),
        session.opponent_max_hp(),
        session.opponent_stats().attack,
        session.opponent_stats().defense,
    ));
    session.start();

    while session.phase() != Phase::Finished && session.turn_count() < max_turns {
        let health = Health { hp: session.player_hp(), max_hp: session.player_max_hp() };
        let action = choose_opponent_action(&mut autopilot, &health, session.config());
        let Some(turn) = session.perform_player_action(action) else {
            break;
        };
        log_report(&mut logs, session.turn_count(), &session, &turn.report);
        if let Some(pending) = turn.pending {
            if let Some(report) = session.resolve_opponent_turn(pending) {
                log_report(&mut logs, session.turn_count(), &session, &report);
            }
        }
    }

    let winner = match session.winner() {
        Some(side) => side.as_str(),
        None => "draw",
    };
    logs.push(format!(
        "[END] winner={} turns={} player_hp={} opponent_hp={}",
        winner,
        session.turn_count(),
        session.player_hp(),
        session.opponent_hp()
    ));

    Ok(DuelResult {
        winner: winner.to_string(),
        turns: session.turn_count(),
        player_name: session.player_name().to_string(),
        opponent_name: session.opponent_name().to_string(),
        player_hp_end: session.player_hp(),
        opponent_hp_end: session.opponent_hp(),
        player_max_hp: session.player_max_hp(),
        opponent_max_hp: session.opponent_max_hp(),
        log: logs,
    })
}

/// Resolve one side: an inline record wins, then a JSON file, then a barcode.
pub fn load_character(
    role: &str,
    inline: Option<&Character>,
    code: Option<&str>,
    path: Option<&str>,
    catalog: &Catalog,
    dice: &mut Dice,
) -> Result<Character> {
    if let Some(character) = inline {
        character
            .validate()
            .with_context(|| format!("invalid inline {} character", role))?;
        return Ok(character.clone());
    }
    if let Some(path) = path {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {} character: {}", role, path))?;
        let character = Character::from_json(&text)
            .with_context(|| format!("invalid {} character: {}", role, path))?;
        return Ok(character);
    }
    match code {
        Some(code) => Ok(generate_character_with(code, catalog, dice.rng_mut())),
        None => bail!("{} needs a barcode or a character file", role),
    }
}

fn log_report(logs: &mut Vec<String>, turn: u32, session: &BattleSession, report: &ActionReport) {
    let tag = match report.actor {
        Side::Player => "PLAYER",
        Side::Opponent => "OPPONENT",
    };
    logs.push(format!(
        "[TURN {}][{}] {} (HP {}/{} vs {}/{})",
        turn,
        tag,
        report.narrate(),
        report.player_hp,
        session.player_max_hp(),
        report.opponent_hp,
        session.opponent_max_hp()
    ));
}
