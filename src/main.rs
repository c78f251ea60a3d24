use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use transit_sim::simulation::{
    CatalogPlayer, Direction, HoldReason, JsonLineDirectory, LineSource, Signal, SignalledMotion,
    SimConfig, TimetableMotion, TransitEngine, VehicleKind,
};

#[derive(Parser)]
#[command(name = "transit_sim")]
#[command(about = "Headless transit line simulator with stop announcements")]
struct Cli {
    /// Line to simulate
    #[arg(default_value = "2")]
    line: String,

    /// Initial direction: outbound or inbound (tam/zpet also accepted)
    #[arg(default_value = "outbound", value_parser = parse_direction)]
    direction: Direction,

    /// Directory holding <line>.json definitions
    #[arg(long, default_value = "lines")]
    lines_dir: PathBuf,

    /// Directory holding sys/ and stops/ audio clips
    #[arg(long, default_value = "audio")]
    audio_dir: PathBuf,

    /// Assumed clip length when the audio manifest has no entry
    #[arg(long, default_value = "1.5")]
    clip_secs: f64,

    /// JSON config file overriding engine timings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of simulation ticks to run
    #[arg(long, default_value = "3600")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.1")]
    delta: f64,

    /// Simulated seconds per real second while driving
    #[arg(long)]
    time_scale: Option<f64>,

    /// Vehicle kind: bus, trolleybus or tram
    #[arg(long, value_parser = parse_vehicle)]
    vehicle: Option<VehicleKind>,

    /// Seed for reproducible disruptions
    #[arg(long)]
    seed: Option<u64>,

    /// Hold point as POSITION:light|roundabout:SECONDS (repeatable)
    #[arg(long = "signal", value_parser = parse_signal)]
    signals: Vec<Signal>,

    /// Sleep for each tick's delta to run in real time
    #[arg(long)]
    realtime: bool,

    /// List available lines and exit
    #[arg(long)]
    list: bool,
}

fn parse_direction(value: &str) -> Result<Direction, String> {
    Direction::parse(value).ok_or_else(|| format!("unknown direction {value:?}"))
}

fn parse_vehicle(value: &str) -> Result<VehicleKind, String> {
    VehicleKind::parse(value).ok_or_else(|| format!("unknown vehicle kind {value:?}"))
}

fn parse_signal(value: &str) -> Result<Signal, String> {
    let parts: Vec<&str> = value.split(':').collect();
    let [position, kind, hold] = parts.as_slice() else {
        return Err(format!("expected POSITION:KIND:SECONDS, got {value:?}"));
    };
    let position_secs: f64 = position
        .parse()
        .map_err(|_| format!("bad signal position {position:?}"))?;
    let kind = match *kind {
        "light" => HoldReason::TrafficLight,
        "roundabout" => HoldReason::Roundabout,
        other => return Err(format!("unknown signal kind {other:?}")),
    };
    let hold_secs: f64 = hold
        .parse()
        .map_err(|_| format!("bad signal hold {hold:?}"))?;
    Ok(Signal {
        position_secs,
        kind,
        hold_secs,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let source = JsonLineDirectory::new(&cli.lines_dir);

    if cli.list {
        list_lines(&source);
        return Ok(());
    }

    if !(cli.delta > 0.0) {
        bail!("--delta must be positive, got {}", cli.delta);
    }

    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path).context("Could not load engine config")?,
        None => SimConfig::default(),
    };
    if let Some(time_scale) = cli.time_scale {
        config.time_scale = time_scale;
    }
    if let Some(vehicle) = cli.vehicle {
        config.vehicle_kind = vehicle;
    }

    let mut engine = TransitEngine::from_source(config, &source, &cli.line, cli.direction)
        .with_player(Box::new(CatalogPlayer::new(&cli.audio_dir, cli.clip_secs)));
    if !cli.signals.is_empty() {
        engine = engine.with_motion(Box::new(SignalledMotion::new(
            TimetableMotion,
            cli.signals.clone(),
        )));
    }
    if let Some(seed) = cli.seed {
        engine = engine.with_seed(seed);
    }

    run_headless(&mut engine, cli.ticks, cli.delta, cli.realtime);
    Ok(())
}

fn list_lines(source: &JsonLineDirectory) {
    let lines = source.list();
    if lines.is_empty() {
        println!("No line definitions found in {}", source.dir().display());
        return;
    }
    for summary in lines {
        println!("{:>4} | {}", summary.id, summary.description);
        if let Ok(line) = source.load(&summary.id) {
            if let Some((start, end)) = line.terminal_names() {
                println!("       {} -> {}", Direction::Outbound, end);
                println!("       {} -> {}", Direction::Inbound, start);
            }
        }
    }
}

/// Run the engine without a display, printing a summary once per simulated second
fn run_headless(engine: &mut TransitEngine, ticks: u32, delta: f64, realtime: bool) {
    info!("Running {} ticks of {}s", ticks, delta);
    let ticks_per_second = (1.0 / delta).ceil().max(1.0) as u32;

    println!("Initial state:");
    engine.print_summary();
    println!();

    let mut tick = 0;
    while tick < ticks {
        let ticks_to_run = ticks_per_second.min(ticks - tick);
        for _ in 0..ticks_to_run {
            tick += 1;
            engine.tick(delta);
            if realtime {
                std::thread::sleep(std::time::Duration::from_secs_f64(delta));
            }
        }

        println!("--- After tick {} ({:.1}s) ---", tick, tick as f64 * delta);
        engine.print_summary();
        println!();
    }

    println!("=== Final State ===");
    engine.print_summary();
}
