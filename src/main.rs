use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dailytop::app::AppContext;
use dailytop::cli::{commands, Cli, Commands};
use dailytop::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Run { interval } => {
            commands::run(Arc::new(ctx), interval.as_deref()).await?;
        }
        Commands::Once => {
            commands::run_once(Arc::new(ctx)).await?;
        }
        Commands::Status => {
            commands::status(&ctx)?;
        }
        Commands::Export { day } => {
            commands::export_day(&ctx, &day)?;
        }
        Commands::Stats { out } => {
            commands::stats(&ctx, out)?;
        }
    }

    Ok(())
}
