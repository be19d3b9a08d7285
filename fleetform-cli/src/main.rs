//! fleetform CLI -- declarative container fleet manager for a single Docker host
//!
//! ```text
//! fleetform plan                 # show what would change
//! fleetform apply                # converge the host
//! fleetform status               # per-resource sync state
//! fleetform config validate      # check fleetform.toml
//! ```

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use fleetform_core::config::{FleetformConfig, GeneralConfig};

use crate::cli::{Cli, Commands, OutputFormat};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.output == OutputFormat::Json {
        colored::control::set_override(false);
    }

    let general = general_config(&cli.config).await;
    if let Err(e) = logging::init_tracing(&general, cli.log_level.as_deref()) {
        eprintln!("{} {}", "error:".red().bold(), e);
        return ExitCode::from(2);
    }
    fleetform_core::metrics::describe_all();

    let writer = OutputWriter::new(cli.output);
    let config_path = cli.config.as_path();

    let result = match cli.command {
        Commands::Plan(args) => commands::plan::execute(args, config_path, &writer).await,
        Commands::Apply(args) => commands::apply::execute(args, config_path, &writer).await,
        Commands::Status => commands::status::execute(config_path, &writer).await,
        Commands::Config(args) => commands::config::execute(args, config_path, &writer).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

/// Logging settings from the config file, or defaults when it cannot be loaded.
///
/// Load errors are reported later by the command itself.
async fn general_config(config_path: &Path) -> GeneralConfig {
    FleetformConfig::load(config_path)
        .await
        .map(|config| config.general)
        .unwrap_or_default()
}

fn report_error(err: &CliError) -> ExitCode {
    tracing::error!(error = %err, exit_code = err.exit_code(), "command failed");
    eprintln!("{} {}", "error:".red().bold(), err);
    let code = u8::try_from(err.exit_code()).unwrap_or(1);
    ExitCode::from(code)
}
