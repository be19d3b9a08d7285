//! Command handlers -- one module per subcommand

pub mod apply;
pub mod config;
pub mod plan;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use colored::{ColoredString, Colorize};
use tracing::info;

use fleetform_core::config::FleetformConfig;
use fleetform_reconciler::{
    BollardBackend, Reconciler, ReconcilerBuilder, ReconcilerConfig, RenewRequest, TaskKind,
};

use crate::cli::RenewArgs;
use crate::error::CliError;

/// Load the effective configuration (file + env overrides), validated.
pub async fn load_config(config_path: &Path) -> Result<FleetformConfig, CliError> {
    info!(path = %config_path.display(), "loading configuration");
    Ok(FleetformConfig::load(config_path).await?)
}

/// Connect to the Docker daemon and build a reconciler from the configuration.
///
/// The daemon is pinged once so that an unreachable socket surfaces as
/// exit code 3 before any planning starts.
pub async fn connect(config: &FleetformConfig) -> Result<Reconciler<BollardBackend>, CliError> {
    let backend = BollardBackend::connect(&config.docker.socket, config.docker.timeout_secs)?;

    let reconciler = ReconcilerBuilder::new()
        .config(ReconcilerConfig::from_core(&config.reconcile))
        .backend(Arc::new(backend))
        .build()?;

    reconciler.ping().await?;
    info!(
        socket = %display_socket(&config.docker.socket),
        prefix = %config.reconcile.prefix,
        "connected to docker"
    );

    Ok(reconciler)
}

/// Convert `--renew-*` flags to a renew request.
pub fn renew_request(args: &RenewArgs) -> RenewRequest {
    RenewRequest {
        containers: args.containers.clone(),
        networks: args.networks.clone(),
    }
}

fn display_socket(socket: &str) -> &str {
    if socket.is_empty() { "(default)" } else { socket }
}

/// Text marker for a task kind: `+` adds, `-` removes, `~` changes in place.
pub(crate) fn kind_marker(kind: TaskKind) -> ColoredString {
    match kind {
        TaskKind::DeleteContainer | TaskKind::DeleteNetwork => "-".red().bold(),
        TaskKind::DetachContainer => "~".yellow().bold(),
        TaskKind::PullImage
        | TaskKind::CreateContainer
        | TaskKind::CreateNetwork
        | TaskKind::StartContainer
        | TaskKind::AttachNetwork => "+".green().bold(),
    }
}
