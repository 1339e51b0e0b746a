//! Starfield - headless tool for the universe core
//!
//! Replays timed input scripts at a fixed frame rate and prints the
//! universe view as JSON lines, or prints the derived planet layout.

mod replay;
mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use starfield_core::{derive_visuals, Universe, UniverseConfig, UniverseKind};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::replay::ReplayOptions;

#[derive(Parser, Debug)]
#[command(name = "starfield")]
#[command(about = "Headless replay and layout tool for the community universe")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "starfield.toml", global = true)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive the universe through a timed input script
    Replay {
        /// JSON list of community records
        #[arg(long)]
        communities: PathBuf,

        /// JSON list of timed input events
        #[arg(long)]
        script: PathBuf,

        /// Show a user's space instead of the home universe
        #[arg(long)]
        owner: Option<String>,

        /// Simulated frame rate
        #[arg(long, default_value_t = 60)]
        fps: u32,

        /// Print every nth frame in addition to frames with input
        #[arg(long, default_value_t = 1)]
        every: u64,
    },
    /// Print the planet layout derived from a community list
    Layout {
        /// JSON list of community records
        #[arg(long)]
        communities: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging. Output goes to stderr so stdout stays JSON.
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starfield v{}", env!("CARGO_PKG_VERSION"));

    let config = UniverseConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Replay {
            communities,
            script,
            owner,
            fps,
            every,
        } => {
            let records = script::load_communities(&communities)?;
            let events = script::load_script(&script)?;
            let kind = match owner {
                Some(owner) => UniverseKind::UserSpace { owner },
                None => UniverseKind::Home,
            };

            let mut universe = Universe::new(kind, config);
            universe.replace_communities(&records);

            let summary = replay::run(&mut universe, &events, ReplayOptions { fps, every }, &mut out)?;
            info!(lines = summary.lines, "Replay written");
        }
        Command::Layout { communities } => {
            let records = script::load_communities(&communities)?;
            let bodies = derive_visuals(&records, &config.layout);
            serde_json::to_writer_pretty(&mut out, &bodies)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}
