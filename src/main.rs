//! Space Explore CLI - play, inspect and script exploration games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use space_explore::SystemColor;
use std::path::PathBuf;
use std::process::ExitCode;

/// Space Explore - a single-player exploration game on a hidden star map
#[derive(Parser, Debug)]
#[command(name = "space-explore")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play interactively in the terminal
    Play {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON config overriding the default constants
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Player color (default: random)
        #[arg(long, value_parser = cli::parse_color)]
        color: Option<SystemColor>,

        /// Write engine logs to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Generate a board and print it
    Board {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON config overriding the default constants
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Player color (default: random)
        #[arg(long, value_parser = cli::parse_color)]
        color: Option<SystemColor>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show hidden systems
        #[arg(long)]
        reveal_all: bool,
    },

    /// Apply a scripted command sequence headlessly
    Run {
        /// Commands such as `n ne collect end` (see `--script` for files)
        commands: Vec<String>,

        /// Read commands from a script file
        #[arg(long)]
        script: Option<PathBuf>,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON config overriding the default constants
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Player color (default: random)
        #[arg(long, value_parser = cli::parse_color)]
        color: Option<SystemColor>,

        /// Simulated milliseconds between commands
        #[arg(long, default_value = "500")]
        tick_ms: u64,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Stop at the first rejected command
        #[arg(long)]
        strict: bool,
    },

    /// Validate a JSON config file
    Validate {
        /// Config file to validate
        #[arg(required = true)]
        config: PathBuf,

        /// Seed for the trial board generation
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Commands::Play {
            seed,
            config,
            color,
            log_file,
        } => cli::init_tracing(log_file.as_deref(), false)
            .and_then(|()| cli::play::execute(seed, config, color)),

        Commands::Board {
            seed,
            config,
            color,
            format,
            reveal_all,
        } => cli::init_tracing(None, true)
            .and_then(|()| cli::board::execute(seed, config, color, format, reveal_all)),

        Commands::Run {
            commands,
            script,
            seed,
            config,
            color,
            tick_ms,
            format,
            strict,
        } => cli::init_tracing(None, true).and_then(|()| {
            cli::run::execute(cli::run::RunOptions {
                commands,
                script,
                seed,
                config,
                color,
                tick_ms,
                format,
                strict,
            })
        }),

        Commands::Validate { config, seed } => {
            cli::init_tracing(None, true).and_then(|()| cli::validate::execute(config, seed))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
