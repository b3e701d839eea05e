//! Breakout trader - main entry point
//!
//! This binary provides two subcommands:
//! - live: Run the polling trading loop (paper or real)
//! - signal: Evaluate the latest bar once and print the decision

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "breakout-trader")]
#[command(about = "Breakout + three-bar pattern signals with a Binance live loop", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run live trading
    Live {
        /// Path to configuration file
        #[arg(short, long, default_value = "configs/btcusdt_1m.json")]
        config: String,

        /// Paper trading mode (orders are logged, not sent)
        #[arg(long)]
        paper: bool,

        /// Live trading mode (orders go to the configured exchange)
        #[arg(long)]
        live: bool,

        /// Cycle interval in seconds (overrides config)
        #[arg(long)]
        cycle_secs: Option<u64>,
    },

    /// Evaluate the latest bar once without trading
    Signal {
        /// Path to configuration file
        #[arg(short, long, default_value = "configs/btcusdt_1m.json")]
        config: String,

        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
    },
}

const LOG_DIR: &str = "logs";

/// Crates whose chatter is held at `warn`: HTTP stack and SMTP transport
const QUIET_CRATES: &[&str] = &["hyper", "reqwest", "rustls", "lettre"];

fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    QUIET_CRATES
        .iter()
        .fold(level.to_string(), |acc, krate| format!("{},{}=warn", acc, krate))
}

/// Console plus a plain-text copy in `logs/{command}_{timestamp}.log`.
/// `RUST_LOG` overrides the default filter.
fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all(LOG_DIR)?;

    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let log_path = PathBuf::from(LOG_DIR).join(&log_filename);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(verbose)
        .with_line_number(verbose);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(tracing_appender::rolling::never(LOG_DIR, &log_filename))
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging to {}", log_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Live { .. } => "live",
        Commands::Signal { .. } => "signal",
    };

    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Live {
            config,
            paper,
            live,
            cycle_secs,
        } => commands::live::run(config, paper, live, cycle_secs),

        Commands::Signal { config, json } => commands::signal::run(config, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_transport_crates() {
        assert_eq!(
            default_filter(false),
            "info,hyper=warn,reqwest=warn,rustls=warn,lettre=warn"
        );
        assert!(default_filter(true).starts_with("debug,"));
    }
}
