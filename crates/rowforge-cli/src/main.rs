use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod commands;

use args::{Cli, Command};

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    // Load .env if present (queue credentials commonly live there)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let exit_code = match &cli.command {
        Command::Generate(args) => commands::generate::run(args),
        Command::Validate(args) => commands::validate::run(args),
        Command::Strategies(args) => commands::strategies::run(args),
        Command::Preview(args) => commands::preview::run(args),
    };

    std::process::exit(exit_code);
}
