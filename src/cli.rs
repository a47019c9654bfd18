// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `regenwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "regenwatch",
    version,
    about = "Trigger an invoice regeneration and wait until it has taken effect.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Regenwatch.toml")]
    pub config: String,

    /// Identifier of the resource (invoice) to regenerate.
    #[arg(long, value_name = "ID", required_unless_present = "dry_run")]
    pub resource: Option<String>,

    /// Override `[endpoint].base_url`.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Override `[watch].poll_interval_ms`.
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Override `[watch].max_attempts`.
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `REGENWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate the config, print the effective settings, and exit
    /// without sending any request.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
