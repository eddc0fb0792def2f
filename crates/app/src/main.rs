mod session;

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use keepsake_core::{AppConfig, DeviceClass, Presentation, SilentBackend};
use tracing_subscriber::EnvFilter;

use crate::session::{Choice, SessionPlan};

fn main() -> keepsake_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => run_play(&args),
        Commands::Config { config } => print_config(config.as_ref()),
    }
}

fn run_play(args: &PlayArgs) -> keepsake_core::Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    if args.constrained {
        config.capabilities.device = DeviceClass::Constrained;
    }
    if args.reduced_motion {
        config.capabilities.reduced_motion = true;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    tracing::info!(song = args.song, choice = ?args.choice, realtime = args.realtime, "starting session");

    let backend = if args.block_autoplay {
        SilentBackend::rejecting()
    } else {
        SilentBackend::new()
    };
    let mut presentation = Presentation::in_memory(&config, backend)?;
    let plan = SessionPlan {
        song: args.song,
        choice: args.choice,
        dwell: Duration::from_millis(args.dwell_ms),
        linger: Duration::from_millis(args.linger_ms),
        realtime: args.realtime,
    };

    let report = session::run(&mut presentation, &plan)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_config(path: Option<&PathBuf>) -> keepsake_core::Result<()> {
    let config = load_config(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> keepsake_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::from_path(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Animated greeting card presentation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Walk through the card with a scripted reader and print a summary.
    Play(PlayArgs),
    /// Print the effective configuration as JSON.
    Config {
        /// Optional JSON configuration file to merge over the defaults.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct PlayArgs {
    /// Optional JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Index of the song option to pick.
    #[arg(long, default_value_t = 0)]
    song: usize,
    /// Answer given on the final overlay.
    #[arg(long, value_enum, default_value_t = Choice::Yes)]
    choice: Choice,
    /// Treat the device as constrained (fewer, slower effects).
    #[arg(long)]
    constrained: bool,
    #[arg(long)]
    reduced_motion: bool,
    /// Simulate a browser that blocks autoplay.
    #[arg(long)]
    block_autoplay: bool,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 1500)]
    dwell_ms: u64,
    #[arg(long, default_value_t = 8000)]
    linger_ms: u64,
    /// Pace the session against the wall clock instead of simulating it.
    #[arg(long)]
    realtime: bool,
}
