use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "habitquest", version, about = "habitquest weekly events, chains and levels")]
struct Cli {
    /// State snapshot file (default: <data dir>/state.json)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Evaluate as of this day instead of today (YYYY-MM-DD)
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show this week's event and progress
    Week,
    /// Record this week's event if it was completed
    Sync,
    /// Record a day's activity
    Log(commands::log::LogArgs),
    /// Write a ledger entry for a week by hand
    Complete(commands::complete::CompleteArgs),
    /// Show achievement chain progress
    Chains {
        /// Only the chain closest to its next step
        #[arg(long)]
        top: bool,
    },
    /// Show level, experience and rewards
    Level,
    /// List recorded weekly events, newest first
    Archive,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("HABITQUEST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let ctx = common::Context {
        state_path: cli.state,
        date: cli.date,
    };

    let result = match cli.command {
        Commands::Week => commands::week::run(&ctx),
        Commands::Sync => commands::sync::run(&ctx),
        Commands::Log(args) => commands::log::run(&ctx, args),
        Commands::Complete(args) => commands::complete::run(&ctx, args),
        Commands::Chains { top } => commands::chains::run(&ctx, top),
        Commands::Level => commands::level::run(&ctx),
        Commands::Archive => commands::archive::run(&ctx),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "habitquest", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
