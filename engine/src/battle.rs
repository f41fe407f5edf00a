//! Turn state machine for one battle between a player and an opponent.
//!
//! The session is the only mutator of battle state. Opponent turns are
//! handed out as [`PendingTurn`] tickets so a front end can pace them; a
//! ticket is honoured at most once, only by the session that issued it, and
//! only while that session is still waiting on the opponent. Resolution always
//! reads the live HP values held by the session.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::character::{Character, CharacterError};
use crate::combat::{choose_opponent_action, compute_damage, EffectiveStats};
use crate::config::BattleConfig;
use crate::life::{apply_damage, heal, heal_amount, Health};
use crate::Dice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Ready,
    PlayerTurn,
    OpponentTurn,
    Finished,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Ready => "ready",
            Phase::PlayerTurn => "playerTurn",
            Phase::OpponentTurn => "opponentTurn",
            Phase::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Opponent => "opponent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Attack,
    Heal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ActionResult {
    Missed,
    Hit { damage: i32, crit: bool },
    Healed { amount: i32 },
}

/// What one resolved action did, with both HPs read after it applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub actor: Side,
    pub action: Action,
    pub result: ActionResult,
    pub player_hp: i32,
    pub opponent_hp: i32,
}

impl ActionReport {
    pub fn narrate(&self) -> String {
        match (self.actor, self.result) {
            (Side::Player, ActionResult::Missed) => "You missed!".to_string(),
            (Side::Player, ActionResult::Hit { damage, crit: true }) => {
                format!("CRIT! You dealt {damage} damage!")
            }
            (Side::Player, ActionResult::Hit { damage, crit: false }) => {
                format!("You dealt {damage} damage!")
            }
            (Side::Player, ActionResult::Healed { amount }) => format!("You healed {amount} HP!"),
            (Side::Opponent, ActionResult::Missed) => "Opponent missed!".to_string(),
            (Side::Opponent, ActionResult::Hit { damage, crit: true }) => {
                format!("Opponent CRIT! {damage} damage!")
            }
            (Side::Opponent, ActionResult::Hit { damage, crit: false }) => {
                format!("Opponent dealt {damage} damage!")
            }
            (Side::Opponent, ActionResult::Healed { amount }) => {
                format!("Opponent healed {amount} HP!")
            }
        }
    }
}

/// Most recent narration lines; the oldest line is evicted once full.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl BattleLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { lines: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Handle for a scheduled opponent turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTurn {
    pub session: u64,
    pub ticket: u64,
    /// Pacing pause the caller should wait before resolving.
    pub delay: Duration,
}

/// Outcome of an accepted player action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTurn {
    pub report: ActionReport,
    /// `None` when the action ended the battle.
    pub pending: Option<PendingTurn>,
}

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
struct Combatant {
    name: String,
    stats: EffectiveStats,
    health: Health,
}

impl Combatant {
    fn new(c: &Character) -> Result<Self, CharacterError> {
        c.validate()?;
        let stats = EffectiveStats::of(c);
        if stats.hp <= 0 {
            return Err(CharacterError::NonPositive {
                id: c.id.clone(),
                field: "effective hp",
                value: stats.hp.into(),
            });
        }
        Ok(Self { name: c.name.clone(), stats, health: Health::new(stats.hp) })
    }
}

pub struct BattleSession {
    id: u64,
    player: Combatant,
    opponent: Combatant,
    phase: Phase,
    turn_count: u32,
    log: BattleLog,
    winner: Option<Side>,
    cfg: BattleConfig,
    dice: Dice,
    next_ticket: u64,
    pending: Option<u64>,
}

impl BattleSession {
    /// Validates both characters and fixes their effective stats. Every
    /// session gets a process-unique id, so its tickets are never accepted
    /// by another session. The battle waits in [`Phase::Ready`] until
    /// [`start`](Self::start).
    pub fn new(
        player: &Character,
        opponent: &Character,
        cfg: BattleConfig,
        dice: Dice,
    ) -> Result<Self, CharacterError> {
        let player = Combatant::new(player)?;
        let opponent = Combatant::new(opponent)?;
        Ok(Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            player,
            opponent,
            phase: Phase::Ready,
            turn_count: 0,
            log: BattleLog::new(cfg.log_capacity),
            winner: None,
            cfg,
            dice,
            next_ticket: 0,
            pending: None,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player_hp(&self) -> i32 {
        self.player.health.hp
    }

    pub fn opponent_hp(&self) -> i32 {
        self.opponent.health.hp
    }

    pub fn player_max_hp(&self) -> i32 {
        self.player.health.max_hp
    }

    pub fn opponent_max_hp(&self) -> i32 {
        self.opponent.health.max_hp
    }

    pub fn player_stats(&self) -> &EffectiveStats {
        &self.player.stats
    }

    pub fn opponent_stats(&self) -> &EffectiveStats {
        &self.opponent.stats
    }

    pub fn player_name(&self) -> &str {
        &self.player.name
    }

    pub fn opponent_name(&self) -> &str {
        &self.opponent.name
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn config(&self) -> &BattleConfig {
        &self.cfg
    }

    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        self.phase = Phase::PlayerTurn;
        self.log.push("Battle Start!");
        tracing::debug!(session = self.id, "battle started");
        true
    }

    /// Accepts `action` only during the player's turn. Anything else is a
    /// silent no-op returning `None`.
    pub fn perform_player_action(&mut self, action: Action) -> Option<PlayerTurn> {
        if self.phase != Phase::PlayerTurn || self.winner.is_some() {
            tracing::debug!(session = self.id, phase = self.phase.as_str(), ?action, "player action ignored");
            return None;
        }
        self.phase = Phase::OpponentTurn;
        self.turn_count += 1;

        let report = self.resolve(Side::Player, action);
        let pending = if self.finish_if_down() { None } else { self.schedule_opponent_turn() };
        Some(PlayerTurn { report, pending })
    }

    /// Issue a ticket for the opponent's turn if one is due and none is outstanding.
    pub fn schedule_opponent_turn(&mut self) -> Option<PendingTurn> {
        if self.phase != Phase::OpponentTurn || self.winner.is_some() || self.pending.is_some() {
            return None;
        }
        self.next_ticket += 1;
        self.pending = Some(self.next_ticket);
        Some(PendingTurn {
            session: self.id,
            ticket: self.next_ticket,
            delay: self.cfg.opponent_delay(),
        })
    }

    pub fn pending_turn(&self) -> Option<PendingTurn> {
        self.pending.map(|ticket| PendingTurn {
            session: self.id,
            ticket,
            delay: self.cfg.opponent_delay(),
        })
    }

    /// Drop the outstanding ticket so a late timer cannot apply it.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn resolve_opponent_turn(&mut self, turn: PendingTurn) -> Option<ActionReport> {
        if turn.session != self.id || self.pending != Some(turn.ticket) {
            tracing::warn!(
                session = self.id,
                ticket_session = turn.session,
                ticket = turn.ticket,
                "stale opponent turn rejected"
            );
            return None;
        }
        self.pending = None;
        if self.phase != Phase::OpponentTurn || self.winner.is_some() {
            return None;
        }

        let action = choose_opponent_action(&mut self.dice, &self.opponent.health, &self.cfg);
        let report = self.resolve(Side::Opponent, action);
        if !self.finish_if_down() {
            self.phase = Phase::PlayerTurn;
        }
        Some(report)
    }

    /// Resolve whatever opponent turn is outstanding without waiting.
    pub fn run_opponent_turn_now(&mut self) -> Option<ActionReport> {
        let turn = self.pending_turn().or_else(|| self.schedule_opponent_turn())?;
        self.resolve_opponent_turn(turn)
    }

    fn resolve(&mut self, side: Side, action: Action) -> ActionReport {
        let (actor, target) = match side {
            Side::Player => (&mut self.player, &mut self.opponent),
            Side::Opponent => (&mut self.opponent, &mut self.player),
        };

        let result = match action {
            Action::Attack => {
                let out = compute_damage(&mut self.dice, &actor.stats, &target.stats, &self.cfg);
                if out.missed {
                    ActionResult::Missed
                } else {
                    apply_damage(&target.name, &mut target.health, out.damage);
                    ActionResult::Hit { damage: out.damage, crit: out.crit }
                }
            }
            Action::Heal => {
                let amount = heal_amount(actor.stats.hp, actor.stats.heal);
                let actual = heal(&actor.name, &mut actor.health, amount);
                ActionResult::Healed { amount: actual }
            }
        };

        let report = ActionReport {
            actor: side,
            action,
            result,
            player_hp: self.player.health.hp,
            opponent_hp: self.opponent.health.hp,
        };
        tracing::debug!(
            session = self.id,
            actor = side.as_str(),
            ?result,
            player_hp = report.player_hp,
            opponent_hp = report.opponent_hp,
            "action resolved"
        );
        self.log.push(report.narrate());
        report
    }

    /// Only one side's HP moves per action, so at most one side can be down.
    fn finish_if_down(&mut self) -> bool {
        let winner = if self.opponent.health.is_down() {
            Side::Player
        } else if self.player.health.is_down() {
            Side::Opponent
        } else {
            return false;
        };
        self.winner = Some(winner);
        self.phase = Phase::Finished;
        self.pending = None;
        self.log.push(match winner {
            Side::Player => "Victory!",
            Side::Opponent => "Defeat...",
        });
        tracing::info!(session = self.id, winner = winner.as_str(), turns = self.turn_count, "battle finished");
        true
    }
}

/// Owns the single active battle. Tickets from a discarded battle carry its
/// session id and can never reach its successor.
pub struct Arena {
    cfg: BattleConfig,
    active: Option<BattleSession>,
}

impl Arena {
    pub fn new(cfg: BattleConfig) -> Self {
        Self { cfg, active: None }
    }

    /// Replaces any active battle; the new one still waits for `start`. On a
    /// malformed character the previous battle is left untouched.
    pub fn start_battle(
        &mut self,
        player: &Character,
        opponent: &Character,
        dice: Dice,
    ) -> Result<&mut BattleSession, CharacterError> {
        let session = BattleSession::new(player, opponent, self.cfg.clone(), dice)?;
        Ok(self.active.insert(session))
    }

    pub fn discard(&mut self) -> Option<BattleSession> {
        self.active.take()
    }

    pub fn active(&self) -> Option<&BattleSession> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut BattleSession> {
        self.active.as_mut()
    }

    /// Route a ticket to the active battle, dropping it if that battle is gone.
    pub fn resolve(&mut self, turn: PendingTurn) -> Option<ActionReport> {
        match self.active.as_mut() {
            Some(session) if session.id == turn.session => session.resolve_opponent_turn(turn),
            _ => {
                tracing::warn!(session = turn.session, "opponent turn for inactive battle dropped");
                None
            }
        }
    }
}
