mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "mediadrop=info,mediadrop_core=info,mediadrop_web=info,tower_http=warn",
        1 => "mediadrop=debug,mediadrop_core=debug,mediadrop_web=debug,tower_http=debug",
        2 => "mediadrop=trace,mediadrop_core=trace,mediadrop_web=trace,tower_http=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Some(Commands::Serve(options)) => commands::serve::run(&options, cli.config.as_deref()).await,
        Some(Commands::Doctor) => commands::doctor::run(cli.config.as_deref()).await,
        Some(Commands::Config { json }) => commands::config::run(cli.config.as_deref(), json).await,
        None => commands::serve::run(&args::ServeOptions::default(), cli.config.as_deref()).await,
    }
}
