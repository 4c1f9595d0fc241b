//! veilpix - hide password-protected secrets in image pixels
//!
//! A CLI over the veilpix library: `hide`, `extract` and `capacity`.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{CapacityCommand, CommandExecutor, ExtractCommand, HideCommand};
use veilpix::config::Settings;
use veilpix::StegoError;

/// veilpix - hide password-protected secrets in image pixels
///
/// Payloads are encrypted with AES-256-GCM (PBKDF2-derived key) and written
/// into the least significant bit of the red channel.
#[derive(Parser)]
#[command(name = "veilpix")]
#[command(version)]
#[command(about = "Hide password-protected text and files inside images")]
#[command(long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (defaults to ~/.veilpix/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a message or file inside a cover image
    Hide(HideCommand),

    /// Recover a hidden message or file
    Extract(ExtractCommand),

    /// Show how much data a cover image can hold
    Capacity(CapacityCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(stego_error) = e.downcast_ref::<StegoError>() {
                eprintln!("Hint: {}", stego_error.user_hint());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    init_logging(cli.verbose, &settings);

    match &cli.command {
        Commands::Hide(cmd) => cmd.execute(&settings),
        Commands::Extract(cmd) => cmd.execute(&settings),
        Commands::Capacity(cmd) => cmd.execute(&settings),
    }
}

/// `RUST_LOG` wins, then `-v`, then the settings file, then `warn`.
fn init_logging(verbose: u8, settings: &Settings) {
    let default_level = match verbose {
        0 => settings.log_level.as_deref().unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
