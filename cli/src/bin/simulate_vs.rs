use clap::{Parser, ValueEnum};
use engine::battle::ActionResult;
use engine::combat::choose_opponent_action;
use engine::life::Health;
use engine::{
    generate_character_with, Action, ActionReport, BattleConfig, BattleSession, Catalog, Dice,
    Phase, Side,
};
use std::path::PathBuf;

#[derive(Copy, Clone, ValueEnum)]
enum Strategy {
    /// Attack every turn
    Attack,
    /// Same heal/attack heuristic the opponent uses
    Auto,
}

#[derive(Parser)]
#[command(name = "simulate-vs")]
#[command(about = "Monte Carlo sim: many battles between two barcodes")]
struct Args {
    /// Player barcode
    #[arg(long)]
    player: String,

    /// Opponent barcode
    #[arg(long)]
    opponent: String,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Safety cap on player turns per trial (overrides the config)
    #[arg(long)]
    max_turns: Option<u32>,

    /// How the player side picks its action
    #[arg(long, value_enum, default_value_t = Strategy::Auto)]
    strategy: Strategy,

    /// Optional catalog file (falls back to the built-in products)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Optional battle tuning file
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,
}

#[derive(Default)]
struct Tally {
    attacks: u32,
    hits: u32,
    crits: u32,
    misses: u32,
    heals: u32,
    damage_on_hits: i64,
}

impl Tally {
    fn record(&mut self, report: &ActionReport) {
        match report.result {
            ActionResult::Missed => {
                self.attacks += 1;
                self.misses += 1;
            }
            ActionResult::Hit { damage, crit } => {
                self.attacks += 1;
                self.hits += 1;
                if crit {
                    self.crits += 1;
                }
                self.damage_on_hits += i64::from(damage);
            }
            ActionResult::Healed { .. } => self.heals += 1,
        }
    }
}

fn rate(n: u32, d: u32) -> f64 {
    if d == 0 {
        0.0
    } else {
        f64::from(n) / f64::from(d)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let catalog = match args.catalog.as_ref() {
        Some(p) => Catalog::load(p)?,
        None => Catalog::builtin(),
    };
    let mut cfg = match args.config.as_ref() {
        Some(p) => BattleConfig::load(p)?,
        None => BattleConfig::default(),
    };
    if let Some(cap) = args.max_turns {
        cfg.max_turns = cap;
    }

    let mut names = Dice::from_seed(args.seed);
    let player = generate_character_with(&args.player, &catalog, names.rng_mut());
    let opponent = generate_character_with(&args.opponent, &catalog, names.rng_mut());

    let mut player_wins = 0u32;
    let mut opponent_wins = 0u32;
    let mut draws = 0u32;
    let mut player_tally = Tally::default();
    let mut opponent_tally = Tally::default();
    let mut turns_vec: Vec<u32> = Vec::with_capacity(args.trials as usize);

    for i in 0..args.trials {
        let trial_seed = args.seed.wrapping_add(u64::from(i));
        let mut session =
            BattleSession::new(&player, &opponent, cfg.clone(), Dice::from_seed(trial_seed))?;
        let mut pilot = Dice::from_seed(!trial_seed);
        session.start();

        while session.phase() != Phase::Finished && session.turn_count() < cfg.max_turns {
            let action = match args.strategy {
                Strategy::Attack => Action::Attack,
                Strategy::Auto => {
                    let health = Health { hp: session.player_hp(), max_hp: session.player_max_hp() };
                    choose_opponent_action(&mut pilot, &health, &cfg)
                }
            };
            let Some(turn) = session.perform_player_action(action) else {
                break;
            };
            player_tally.record(&turn.report);
            if let Some(report) = turn.pending.and_then(|p| session.resolve_opponent_turn(p)) {
                opponent_tally.record(&report);
            }
        }

        match session.winner() {
            Some(Side::Player) => player_wins += 1,
            Some(Side::Opponent) => opponent_wins += 1,
            None => draws += 1,
        }
        if session.winner().is_some() {
            turns_vec.push(session.turn_count());
        }
    }

    turns_vec.sort_unstable();
    let avg_turns = if turns_vec.is_empty() {
        0.0
    } else {
        turns_vec.iter().map(|&t| u64::from(t)).sum::<u64>() as f64 / turns_vec.len() as f64
    };
    let median_turns = if turns_vec.is_empty() {
        0
    } else {
        let m = turns_vec.len() / 2;
        if turns_vec.len() % 2 == 1 {
            turns_vec[m]
        } else {
            (turns_vec[m - 1] + turns_vec[m]) / 2
        }
    };

    println!("simulate-vs results");
    println!("-------------------");
    println!("trials:              {}", args.trials);
    println!(
        "player:              {} (HP {}, ATK {}, DEF {})",
        player.name, player.stats.hp, player.stats.attack, player.stats.defense
    );
    println!(
        "opponent:            {} (HP {}, ATK {}, DEF {})",
        opponent.name, opponent.stats.hp, opponent.stats.attack, opponent.stats.defense
    );
    println!();
    println!("player win rate:     {:.1}%", rate(player_wins, args.trials) * 100.0);
    println!("opponent win rate:   {:.1}%", rate(opponent_wins, args.trials) * 100.0);
    println!("draws (turn cap):    {}", draws);
    for (label, t) in [("player", &player_tally), ("opponent", &opponent_tally)] {
        println!(
            "{:<9} hit {:.1}%  miss {}  crit {:.1}%  heals {}  avg dmg/hit {:.2}",
            label,
            rate(t.hits, t.attacks) * 100.0,
            t.misses,
            rate(t.crits, t.hits) * 100.0,
            t.heals,
            if t.hits == 0 { 0.0 } else { t.damage_on_hits as f64 / f64::from(t.hits) }
        );
    }
    println!("avg turns (decided): {:.2}", avg_turns);
    println!("median turns:        {}", median_turns);

    Ok(())
}
