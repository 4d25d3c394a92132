use clap::Parser;
use tracing_subscriber::EnvFilter;

use ollascan::cli::{self, Cli, Commands};
use ollascan::errors::OllascanError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    let result = match cli.command {
        Commands::Scan(args) => cli::scan::handle_scan(args).await,
        Commands::Exec(args) => cli::exec::handle_exec(args).await,
    };

    match result {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            let exit_code = match &e {
                OllascanError::Config(_) => 2,
                OllascanError::UnsupportedFormat(_) | OllascanError::Parse(_) => 3,
                OllascanError::InvalidTarget(_) => 4,
                OllascanError::Command(_) => 5,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}
