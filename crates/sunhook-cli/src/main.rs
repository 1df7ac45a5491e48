use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sunhook_core::{CONFIG_FILE, ShineCatalog, TrackerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sunhook")]
#[command(about = "Super Mario Sunshine tracker for the Dolphin emulator", version)]
struct Args {
    /// Config file; created with defaults when missing
    #[arg(short, long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Zones JSON used to name the shine linked to each ability
    #[arg(short, long, global = true)]
    shines: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Track the game until Ctrl+C (default)
    Watch {
        /// Write the memory state JSON here on every change
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Attach once, sample one tick and print the memory state as JSON
    Status,
    /// List emulator processes and their RAM regions
    Regions,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sunhook=info".parse()?))
        .init();

    let args = Args::parse();
    let config = TrackerConfig::load_or_create(&args.config);

    let catalog = match &args.shines {
        Some(path) => match ShineCatalog::load(path) {
            Ok(catalog) => {
                info!("Loaded {} shine ids from {}", catalog.len(), path.display());
                Some(Arc::new(catalog))
            }
            Err(e) => {
                warn!("Failed to load shine data from {}: {}", path.display(), e);
                None
            }
        },
        None => None,
    };

    match args.command.unwrap_or(Command::Watch { output: None }) {
        Command::Watch { output } => commands::watch::run(&config, catalog, output.as_deref()),
        Command::Status => commands::status::run(&config, catalog.as_deref()),
        Command::Regions => commands::regions::run(&config),
    }
}
