//! mission-runner: run a mission headless and print its outcome as JSON.
//!
//! Usage:
//!   mission-runner --scenario warehouse-raid --seed 11
//!   mission-runner --mission missions/raid.json --config tuning.json --events
//!
//! A small autopilot plays the crew: it fetches loot and terminals named by
//! objectives, walks to evac once the primaries are done (or a retreat was
//! ordered with `--retreat-at`) and extracts.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use squadfall_core::commands::Command;
use squadfall_core::constants::INTERACT_REACH;
use squadfall_core::enums::*;
use squadfall_core::mission::{MissionSpec, ObjectiveKind};
use squadfall_core::state::{ActorView, SessionSnapshot};
use squadfall_core::types::TilePos;
use squadfall_sim::mission_state::InteractableStatus;
use squadfall_sim::scenario::{self, ScenarioId};
use squadfall_sim::{SimConfig, SimulationEngine};

/// Ticks between autopilot passes.
const AUTOPILOT_INTERVAL: u64 = 10;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    WarehouseRaid,
    Holdout,
}

impl From<Scenario> for ScenarioId {
    fn from(s: Scenario) -> Self {
        match s {
            Scenario::WarehouseRaid => ScenarioId::WarehouseRaid,
            Scenario::Holdout => ScenarioId::Holdout,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "mission-runner", about = "Run a squadfall mission headless")]
struct Args {
    /// Mission file (JSON `MissionSpec`). Overrides --scenario.
    #[arg(long)]
    mission: Option<PathBuf>,

    /// Built-in scenario to run when no mission file is given.
    #[arg(long, value_enum, default_value = "warehouse-raid")]
    scenario: Scenario,

    /// Engine tuning file (JSON `SimConfig`); missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the mission seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Give up and conclude the mission after this many ticks.
    #[arg(long, default_value_t = 12_000)]
    max_ticks: u64,

    /// Order a retreat at this tick.
    #[arg(long)]
    retreat_at: Option<u64>,

    /// Print every simulation event to stderr as a JSON line.
    #[arg(long)]
    events: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(message) = run(&args) {
        eprintln!("mission-runner: {message}");
        process::exit(1);
    }
}

fn load_mission(args: &Args) -> Result<MissionSpec, String> {
    match &args.mission {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            serde_json::from_str(&text).map_err(|e| format!("invalid mission {}: {e}", path.display()))
        }
        None => Ok(scenario::build(args.scenario.into())),
    }
}

fn load_config(args: &Args) -> Result<SimConfig, String> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            serde_json::from_str(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), String> {
    let mission = load_mission(args)?;
    let config = load_config(args)?;
    let negotiation = mission.negotiation;
    let mut engine = SimulationEngine::new(mission, config).map_err(|e| format!("mission rejected: {e}"))?;

    engine.queue_command(Command::ConfirmDeployment);
    if negotiation {
        engine.queue_command(Command::EndNegotiation);
    }

    while !engine.is_complete() && engine.time().tick < args.max_ticks {
        let snapshot = engine.tick();
        for event in engine.drain_events() {
            if args.events {
                match serde_json::to_string(&event) {
                    Ok(line) => eprintln!("{line}"),
                    Err(e) => warn!(%e, "event not serializable"),
                }
            }
        }
        if args.retreat_at == Some(snapshot.time.tick) {
            engine.queue_command(Command::InitiateRetreat);
        }
        if snapshot.time.tick % AUTOPILOT_INTERVAL == 0 {
            engine.queue_commands(autopilot(&engine, &snapshot));
        }
    }

    let outcome = match engine.outcome() {
        Some(outcome) => outcome.clone(),
        None => {
            info!(ticks = engine.time().tick, "tick limit reached");
            engine.conclude()
        }
    };
    let json = serde_json::to_string_pretty(&outcome).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn is_idle_crew(actor: &ActorView) -> bool {
    actor.faction == Faction::Crew && !actor.extracted && actor.state == BehaviorState::Idle
}

fn nearest(from: TilePos, tiles: &[TilePos]) -> Option<TilePos> {
    tiles
        .iter()
        .copied()
        .min_by(|a, b| from.distance_to(a).total_cmp(&from.distance_to(b)))
}

/// Commands for idle crew members.
fn autopilot(engine: &SimulationEngine, snapshot: &SessionSnapshot) -> Vec<Command> {
    let session = engine.session();
    let mut idle: Vec<&ActorView> = snapshot.actors.iter().filter(|a| is_idle_crew(a)).collect();
    let mut commands = Vec::new();

    let primaries_done = session.mission.primaries_complete();
    if snapshot.evac_available && (primaries_done || snapshot.retreating) {
        let evac = engine.grid().zone_tiles(ZoneKind::Evac);
        for actor in idle {
            if engine.grid().zone_at(actor.position) == ZoneKind::Evac {
                commands.push(Command::Extract { actor: actor.id });
            } else if let Some(to) = nearest(actor.position, &evac) {
                commands.push(Command::Move { actor: actor.id, to });
            }
        }
        return commands;
    }

    for objective in &session.mission.objectives {
        if objective.state.is_terminal() {
            continue;
        }
        let object_id = match &objective.spec.kind {
            ObjectiveKind::Retrieve { object_id } | ObjectiveKind::Hack { object_id } => object_id,
            _ => continue,
        };
        let Some(object) = session.mission.interactables.get(object_id) else {
            continue;
        };
        if object.status != InteractableStatus::Available || object.claimed_by.is_some() {
            continue;
        }
        let Some(index) = (0..idle.len()).min_by(|&a, &b| {
            let da = idle[a].position.distance_to(&object.position);
            let db = idle[b].position.distance_to(&object.position);
            da.total_cmp(&db)
        }) else {
            break;
        };
        let actor = idle.remove(index);
        if actor.position.chebyshev_to(&object.position) <= INTERACT_REACH {
            commands.push(Command::Interact {
                actor: actor.id,
                object_id: object_id.clone(),
            });
        } else {
            commands.push(Command::Move {
                actor: actor.id,
                to: object.position,
            });
        }
    }
    commands
}
