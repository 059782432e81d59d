use std::{process::ExitCode, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("profile_sync=warn".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {e:?}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let instance = backend::open_instance(&cli.global).await?;
    let format = cli.format;

    match &cli.command {
        Commands::Profile(args) => {
            let settle_limit = Duration::from_secs(cli.global.timeout);
            commands::profile::run(&instance, args, format, settle_limit).await
        }
        Commands::Login(args) => commands::session::login(&instance, args, format).await,
        Commands::Register(args) => commands::session::register(&instance, args, format).await,
        Commands::Logout => commands::session::logout(&instance, format).await,
        Commands::Settings(args) => commands::settings::run(&instance, args, format).await,
        Commands::Throttle => commands::throttle::run(&instance, format).await,
    }
}
