mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cours_sync_core::ImportConfig;
use log::debug;

#[derive(Parser)]
#[command(name = "cours-sync")]
#[command(about = "Import your course schedule (.ics) into a dedicated Google Calendar")]
struct Cli {
    /// Config file to use instead of ~/.config/cours-sync/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the course calendar with the events of an ICS file
    Import {
        /// Schedule exported from the university timetable
        file: PathBuf,
    },
    /// Show what an import would create, without contacting Google
    Preview {
        file: PathBuf,
    },
    /// Authenticate with Google and cache the token
    Auth,
    /// Delete the cached Google token
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = match &cli.config {
        Some(path) => ImportConfig::load_from(path)?,
        None => ImportConfig::load()?,
    };
    debug!("Google directory: {}", config.google_dir().display());

    match cli.command {
        Commands::Import { file } => commands::import::run(&config, &file).await,
        Commands::Preview { file } => commands::preview::run(&config, &file).await,
        Commands::Auth => commands::auth::run(&config).await,
        Commands::Logout => commands::logout::run(&config),
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
