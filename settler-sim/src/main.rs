use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use settler_ai::{
    AiMetrics, AiPlayer, CommandLog, CommandSink, DecisionEngine, PassiveGeneral, PlayerId,
    PlayerInputs,
};
use std::path::PathBuf;

mod host;
mod loader;
mod policies;

use host::World;
use policies::{FrontierBorder, NearestFreeSite};

/// How far placement and border searches look from a partition centre.
const SEARCH_RADIUS: i16 = 30;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario JSON (world snapshot and economy). Uses a built-in map if omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// AI tuning constants as JSON. Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 100)]
    ticks: u64,

    /// Write every emitted command to this file as JSON lines
    #[arg(long)]
    command_log: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize)]
struct PlayerSummary<'a> {
    player: PlayerId,
    end_game: bool,
    metrics: &'a AiMetrics,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    log::info!("Starting settler-sim...");

    let config = loader::load_config(args.config.as_deref())?;
    let scenario = loader::load_scenario(args.scenario.as_deref())?;
    let mut world = World::new(scenario.world);

    let mut engines: Vec<DecisionEngine> = world
        .living_players()
        .into_iter()
        .map(|player| {
            DecisionEngine::new(
                player,
                config.clone(),
                Box::new(scenario.economy.clone()),
                Box::new(PassiveGeneral),
                Box::new(FrontierBorder::new(SEARCH_RADIUS as u32)),
                Box::new(NearestFreeSite::new(SEARCH_RADIUS)),
            )
        })
        .collect();
    log::info!("{} computer players", engines.len());

    let mut command_log = match &args.command_log {
        Some(path) => Some(
            CommandLog::create(path)
                .with_context(|| format!("Failed to create command log {}", path.display()))?,
        ),
        None => None,
    };

    for tick in 0..args.ticks {
        for engine in engines.iter_mut() {
            let mut inputs = PlayerInputs::new(engine.player());
            engine.apply_rules(&world.snapshot, &mut inputs);

            if let Some(log) = command_log.as_mut() {
                log.set_context(tick, inputs.player);
                for command in &inputs.commands {
                    log.submit(command.clone());
                }
            }
            for command in &inputs.commands {
                world.apply(inputs.player, command);
            }
        }
        world.advance();

        if tick % 25 == 0 {
            log::info!(
                "Tick: {} | buildings: {} | units: {}",
                tick,
                world.snapshot.buildings.len(),
                world.snapshot.units.len()
            );
        }
    }

    if let Some(log) = command_log {
        log.finish().context("Failed to write command log")?;
    }

    log::info!(
        "Simulation finished: {} commands applied, {} rejected, {} buildings completed",
        world.stats.applied,
        world.stats.rejected,
        world.stats.completed
    );
    for engine in &engines {
        let metrics = engine.metrics();
        log::info!(
            "{} [{}]: {} commands, {} failed placements, {:.3} ms/tick",
            engine.player(),
            engine.name(),
            metrics.commands(),
            metrics.failed_placements,
            metrics.tick_avg_ms()
        );
        let summary = PlayerSummary {
            player: engine.player(),
            end_game: engine.is_end_game(),
            metrics,
        };
        println!("{}", serde_json::to_string(&summary)?);
    }

    Ok(())
}
