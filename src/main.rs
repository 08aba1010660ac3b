mod cli;
mod config;
mod engine;
mod explain;
mod plan;
mod run;
mod ssh;
mod storage;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "KEEL_LOG";

fn main() {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            process::exit(1);
        }
    };

    init_logging(cli.verbose || config.verbose);

    if let Err(e) = cli::run(&config, cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Logs go to stderr so narration on stdout stays clean.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}
