//! Headless Battle Runner
//!
//! Runs seeded fleet-vs-fleet trials through either resolver and prints a
//! JSON or text summary. Useful for balancing ship stats.

use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use star_armada::battle::TacticalEngagement;
use star_armada::combat::{BattleResult, Combatant, Outcome, ShipClass, StrategicBattle};
use star_armada::core::config::CombatConfig;
use star_armada::core::error::{CombatError, Result};
use star_armada::core::types::{CombatantId, FactionId, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// 3 fighters vs 3 fighters
    Duel,
    /// 2 battleships vs 5 scouts
    BattleshipsVsScouts,
    /// Fleets from --initiator and --responder
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Strategic,
    Tactical,
}

/// Headless Battle Runner - seeded combat trials
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run seeded battles and summarize the outcomes")]
struct Args {
    /// Preset fleet matchup
    #[arg(long, value_enum, default_value_t = Scenario::Duel)]
    scenario: Scenario,

    /// Comma-separated initiator classes for the custom scenario
    #[arg(long, default_value = "fighter,fighter,fighter")]
    initiator: String,

    /// Comma-separated responder classes for the custom scenario
    #[arg(long, default_value = "fighter,fighter,fighter")]
    responder: String,

    /// Resolver to use
    #[arg(long, value_enum, default_value_t = Mode::Strategic)]
    mode: Mode,

    /// Number of battles to run
    #[arg(long, default_value_t = 100)]
    trials: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Combat config TOML (defaults are used when omitted)
    #[arg(long)]
    config: Option<String>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every trial's outcome to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct Summary {
    scenario: String,
    mode: String,
    trials: u32,
    initiator_wins: u32,
    responder_wins: u32,
    draws: u32,
    timeouts: u32,
    average_rounds: f32,
    max_rounds_seen: u32,
    average_initiator_losses: f32,
    average_responder_losses: f32,
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("star_armada=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CombatConfig::load(path)?,
        None => CombatConfig::default(),
    };
    config.validate()?;

    let (initiator_classes, responder_classes) = fleets(&args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    tracing::info!(
        "Running {} {:?} trials: {} vs {} ships, seed {}",
        args.trials,
        args.mode,
        initiator_classes.len(),
        responder_classes.len(),
        seed
    );

    let mut summary = Summary {
        scenario: format!("{:?}", args.scenario),
        mode: format!("{:?}", args.mode),
        trials: args.trials,
        initiator_wins: 0,
        responder_wins: 0,
        draws: 0,
        timeouts: 0,
        average_rounds: 0.0,
        max_rounds_seen: 0,
        average_initiator_losses: 0.0,
        average_responder_losses: 0.0,
        seed,
    };

    let mut total_rounds = 0u64;
    let mut initiator_losses = 0usize;
    let mut responder_losses = 0usize;

    for trial in 0..args.trials {
        let initiator = build_fleet(0, FactionId::new(0), &initiator_classes);
        let responder = build_fleet(1000, FactionId::new(1), &responder_classes);
        let result = run_trial(args.mode, initiator, responder, &config, &mut rng)?;

        match result.outcome {
            Outcome::InitiatorVictory => summary.initiator_wins += 1,
            Outcome::ResponderVictory => summary.responder_wins += 1,
            Outcome::Timeout => summary.timeouts += 1,
            _ => summary.draws += 1,
        }
        total_rounds += result.rounds as u64;
        summary.max_rounds_seen = summary.max_rounds_seen.max(result.rounds);
        initiator_losses += result.initiator_destroyed;
        responder_losses += result.responder_destroyed;

        if args.verbose {
            eprintln!(
                "  [{}] {:?} after {} rounds ({} / {} destroyed)",
                trial,
                result.outcome,
                result.rounds,
                result.initiator_destroyed,
                result.responder_destroyed
            );
        }
    }

    if args.trials > 0 {
        let n = args.trials as f32;
        summary.average_rounds = total_rounds as f32 / n;
        summary.average_initiator_losses = initiator_losses as f32 / n;
        summary.average_responder_losses = responder_losses as f32 / n;
    }

    match args.format.as_str() {
        "text" => {
            println!("Battle Summary");
            println!("==============");
            println!("Scenario: {} ({})", summary.scenario, summary.mode);
            println!("Trials: {}", summary.trials);
            println!("Initiator wins: {}", summary.initiator_wins);
            println!("Responder wins: {}", summary.responder_wins);
            println!("Draws: {}", summary.draws);
            println!("Timeouts: {}", summary.timeouts);
            println!(
                "Rounds: {:.1} average, {} max",
                summary.average_rounds, summary.max_rounds_seen
            );
            println!(
                "Average losses: {:.2} initiator, {:.2} responder",
                summary.average_initiator_losses, summary.average_responder_losses
            );
            println!("Seed: {}", summary.seed);
        }
        other => {
            if other != "json" {
                eprintln!("Unknown format '{}', defaulting to json", other);
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn fleets(args: &Args) -> Result<(Vec<ShipClass>, Vec<ShipClass>)> {
    match args.scenario {
        Scenario::Duel => Ok((vec![ShipClass::Fighter; 3], vec![ShipClass::Fighter; 3])),
        Scenario::BattleshipsVsScouts => {
            Ok((vec![ShipClass::Battleship; 2], vec![ShipClass::Scout; 5]))
        }
        Scenario::Custom => Ok((parse_classes(&args.initiator)?, parse_classes(&args.responder)?)),
    }
}

fn parse_classes(list: &str) -> Result<Vec<ShipClass>> {
    list.split(',')
        .filter(|name| !name.trim().is_empty())
        .map(|name| {
            ShipClass::from_name(name)
                .ok_or_else(|| CombatError::Config(format!("unknown ship class '{}'", name.trim())))
        })
        .collect()
}

fn build_fleet(first_id: u32, faction: FactionId, classes: &[ShipClass]) -> Vec<Combatant> {
    classes
        .iter()
        .enumerate()
        .map(|(i, class)| {
            Combatant::from_class(
                CombatantId::new(first_id + i as u32),
                faction,
                Vec2::default(),
                *class,
            )
        })
        .collect()
}

fn run_trial(
    mode: Mode,
    initiator: Vec<Combatant>,
    responder: Vec<Combatant>,
    config: &CombatConfig,
    rng: &mut ChaCha8Rng,
) -> Result<BattleResult> {
    let factions = (FactionId::new(0), FactionId::new(1));
    match mode {
        Mode::Strategic => {
            let mut battle = StrategicBattle::new(
                factions,
                initiator,
                responder,
                Vec2::default(),
                config.max_rounds,
            );
            Ok(battle.resolve(rng))
        }
        Mode::Tactical => {
            let mut engagement = TacticalEngagement::new(
                factions,
                initiator,
                responder,
                Vec2::default(),
                None,
                config,
                rng.gen(),
            )?;
            Ok(engagement.auto_resolve())
        }
    }
}
