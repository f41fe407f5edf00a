use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use encoding_rs::Encoding;
use engine::api::{simulate_duel, DuelConfig};
use engine::{
    generate_character_with, Action, Arena, BattleConfig, Catalog, Character, Dice, Phase, Side,
};
use tracing::Level;

#[derive(Copy, Clone, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Cmd {
    /// Turn a barcode into a character
    Generate {
        /// Barcode (JAN/EAN); unknown codes become mystery characters
        #[arg(long)]
        code: String,
        /// Seed for the name roll (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Run one automatic battle and print its log
    Duel {
        #[arg(long)]
        player: Option<String>,
        /// Character JSON instead of a player barcode
        #[arg(long)]
        player_file: Option<PathBuf>,
        #[arg(long)]
        opponent: Option<String>,
        /// Character JSON instead of an opponent barcode
        #[arg(long)]
        opponent_file: Option<PathBuf>,
        /// RNG seed for determinism
        #[arg(long, default_value_t = 2025)]
        seed: u64,
        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fight interactively: type `a` to attack, `h` to heal, `q` to leave
    Play {
        #[arg(long)]
        player: String,
        #[arg(long)]
        opponent: String,
        /// RNG seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Skip the pause before the opponent acts
        #[arg(long, default_value_t = false)]
        no_delay: bool,
    },
    /// List the products in the catalog
    Catalog,
    /// Print the effective battle tuning as JSON
    ConfigDump,
}

#[derive(Parser)]
#[command(name = "battler-cli")]
#[command(about = "Barcode battler CLI harness")]
struct Cli {
    /// Product catalog (.json/.yaml) replacing the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Battle tuning (.json/.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log engine events to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn read_text_auto(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    match path {
        Some(p) => Catalog::load(p),
        None => Ok(Catalog::builtin()),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BattleConfig> {
    match path {
        Some(p) => BattleConfig::load(p),
        None => Ok(BattleConfig::default()),
    }
}

fn read_character_file(path: &Path) -> anyhow::Result<Character> {
    let text = read_text_auto(path)?;
    Character::from_json(&text)
        .with_context(|| format!("invalid character file: {}", path.display()))
}

fn print_character(c: &Character, format: Format) -> anyhow::Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(c)?),
        Format::Text => {
            let stars = "★".repeat(usize::from(c.rarity.stars()));
            let element = c.element.map(|e| e.label()).unwrap_or("-");
            println!("{} [{}] {}", c.name, element, stars);
            println!("  from:    {}", c.product_name);
            println!(
                "  stats:   HP {}  ATK {}  DEF {}  SPD {}",
                c.stats.hp,
                c.stats.attack,
                c.stats.defense,
                c.stats.speed.map(|s| s.to_string()).unwrap_or_else(|| "-".into())
            );
            println!(
                "  rolls:   miss {}%  crit {}%  heal {}%",
                c.stats.miss_chance, c.stats.crit_chance, c.stats.heal
            );
            if c.is_campaign {
                println!("  campaign boost x{}", c.multiplier);
            }
        }
    }
    Ok(())
}

fn play(
    catalog: &Catalog,
    cfg: BattleConfig,
    player_code: &str,
    opponent_code: &str,
    seed: Option<u64>,
    no_delay: bool,
) -> anyhow::Result<()> {
    let mut dice = match seed {
        Some(s) => Dice::from_seed(s),
        None => Dice::from_entropy(),
    };
    let player = generate_character_with(player_code, catalog, dice.rng_mut());
    let opponent = generate_character_with(opponent_code, catalog, dice.rng_mut());

    let mut arena = Arena::new(cfg);
    let session = arena
        .start_battle(&player, &opponent, dice)
        .context("characters could not enter battle")?;
    println!(
        "{} (HP {}) vs {} (HP {})",
        session.player_name(),
        session.player_max_hp(),
        session.opponent_name(),
        session.opponent_max_hp()
    );
    session.start();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        let Some(session) = arena.active_mut() else {
            break;
        };
        if session.phase() == Phase::Finished {
            break;
        }
        print!(
            "[turn {}] you {}/{} | opponent {}/{} > ",
            session.turn_count() + 1,
            session.player_hp(),
            session.player_max_hp(),
            session.opponent_hp(),
            session.opponent_max_hp()
        );
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            arena.discard();
            break;
        };
        let action = match line?.trim() {
            "a" | "attack" => Action::Attack,
            "h" | "heal" => Action::Heal,
            "q" | "quit" => {
                arena.discard();
                break;
            }
            other => {
                println!("unknown command '{}': use a, h or q", other);
                continue;
            }
        };

        let Some(turn) = session.perform_player_action(action) else {
            continue;
        };
        println!("  {}", turn.report.narrate());
        if let Some(pending) = turn.pending {
            if !no_delay {
                thread::sleep(pending.delay);
            }
            if let Some(report) = arena.resolve(pending) {
                println!("  {}", report.narrate());
            }
        }
    }

    match arena.active().and_then(|s| s.winner()) {
        Some(Side::Player) => println!("Victory!"),
        Some(Side::Opponent) => println!("Defeat..."),
        None => println!("Battle abandoned."),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Cmd::Generate { code, seed, format } => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let mut dice = match seed {
                Some(s) => Dice::from_seed(s),
                None => Dice::from_entropy(),
            };
            let character = generate_character_with(&code, &catalog, dice.rng_mut());
            print_character(&character, format)?;
        }
        Cmd::Duel {
            player,
            player_file,
            opponent,
            opponent_file,
            seed,
            json,
        } => {
            let cfg = DuelConfig {
                player: player_file.as_deref().map(read_character_file).transpose()?,
                player_code: player,
                player_path: None,
                opponent: opponent_file.as_deref().map(read_character_file).transpose()?,
                opponent_code: opponent,
                opponent_path: None,
                catalog_path: cli.catalog.map(|p| p.to_string_lossy().into_owned()),
                config_path: cli.config.map(|p| p.to_string_lossy().into_owned()),
                battle: None,
                seed,
            };
            let res = simulate_duel(cfg)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&res)?);
            } else {
                for line in &res.log {
                    println!("{}", line);
                }
            }
        }
        Cmd::Play {
            player,
            opponent,
            seed,
            no_delay,
        } => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let cfg = load_config(cli.config.as_deref())?;
            play(&catalog, cfg, &player, &opponent, seed, no_delay)?;
        }
        Cmd::Catalog => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            for (code, product) in catalog.iter() {
                println!(
                    "{}  {:<28} {:<12} ¥{:<5}{}",
                    code,
                    product.name,
                    product.category,
                    product.price,
                    if product.is_campaign { " [campaign]" } else { "" }
                );
            }
        }
        Cmd::ConfigDump => {
            let cfg = load_config(cli.config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
    }

    Ok(())
}
