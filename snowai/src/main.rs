// snowai/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug snowai validate ... to see resolution details
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate => commands::validate::execute(&cli.source),
        Commands::List => commands::list::execute(&cli.source),
        Commands::Show { app, format } => commands::show::execute(&cli.source, &app, format),
        Commands::CheckEnv { app, strict } => {
            commands::check_env::execute(&cli.source, &app, strict)
        }
        Commands::Init { dir, force } => commands::init::execute(dir, force),
    }
}
