pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dailytop")]
#[command(about = "Tracks a ranked listing and publishes a daily leaderboard", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/dailytop/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the source until interrupted
    Run {
        /// Override the configured poll interval (e.g. "30s", "5m")
        #[arg(short, long)]
        interval: Option<String>,
    },
    /// Run a single poll cycle and exit
    Once,
    /// Show the current-day marker and stored buckets
    Status,
    /// Export a stored day bucket (MM-DD-YYYY or YYYY-MM-DD)
    Export {
        day: String,
    },
    /// Write category statistics across all stored days
    Stats {
        /// Output directory (default: the export directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}
