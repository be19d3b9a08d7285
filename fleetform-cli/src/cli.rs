//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// fleetform -- declarative container fleet manager for a single Docker host.
///
/// Use `fleetform <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "fleetform", version, about, long_about = None)]
pub struct Cli {
    /// Path to the fleetform.toml configuration file.
    #[arg(short, long, global = true, default_value = "fleetform.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the tasks needed to converge the host, without changing anything.
    Plan(PlanArgs),

    /// Converge the host to the configured state.
    Apply(ApplyArgs),

    /// Compare each managed resource with the configured state.
    Status,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- renew ----

/// Resources to tear down and recreate even when they look up to date.
#[derive(Args, Debug, Clone, Default)]
pub struct RenewArgs {
    /// Force recreation of a container (logical name, repeatable).
    #[arg(long = "renew-container", value_name = "NAME")]
    pub containers: Vec<String>,

    /// Force recreation of a network (logical name, repeatable).
    #[arg(long = "renew-network", value_name = "NAME")]
    pub networks: Vec<String>,
}

// ---- plan ----

/// Compute the staged task plan.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub renew: RenewArgs,
}

// ---- apply ----

/// Compute and execute the staged task plan.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub renew: RenewArgs,

    /// Print the plan and stop before executing it.
    #[arg(long)]
    pub dry_run: bool,
}

// ---- config ----

/// Manage fleetform configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, docker, reconcile, containers).
        #[arg(long)]
        section: Option<String>,
    },
}
