mod commands;
mod render;

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "showsync")]
#[command(about = "Plan reconciliation between a show scheduler and a calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two snapshots and print the actions to apply
    Plan {
        /// Snapshot of what both systems hold now
        #[arg(long)]
        current: PathBuf,

        /// Snapshot of what both systems should hold
        #[arg(long)]
        desired: PathBuf,

        /// Policy file (defaults to ~/.config/showsync/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Scheduler environment export, used for the default timezone
        #[arg(long)]
        env: Option<PathBuf>,

        /// Print the plan as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// List every action even when there are many
        #[arg(short, long)]
        verbose: bool,
    },
    /// Stamp identity and state hashes onto a draft snapshot
    Hash { file: PathBuf },
    /// Check the stored hashes in a snapshot
    Verify { file: PathBuf },
    /// Show the policy file path and its contents
    Config {
        /// Write a commented default policy file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            current,
            desired,
            config,
            env,
            json,
            verbose,
        } => {
            let policy = commands::load_policy(config.as_deref(), env.as_deref())?;
            commands::plan::run(&current, &desired, &policy, json, verbose)
        }
        Commands::Hash { file } => commands::hash::run(&file),
        Commands::Verify { file } => commands::verify::run(&file),
        Commands::Config { init } => commands::config::run(init),
    }
}

/// Logs go to stderr so `plan --json` output stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("SHOWSYNC_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "showsync=debug,showsync_core=debug,info"
        } else {
            "showsync=info,showsync_core=info,warn"
        })
    });

    let format = env::var("SHOWSYNC_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}
