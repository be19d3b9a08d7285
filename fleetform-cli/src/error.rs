//! CLI-specific error types and exit code mapping

use fleetform_core::error::FleetformError;
use fleetform_reconciler::ReconcileError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The apply ran to completion but some tasks failed.
    #[error("apply incomplete: {0}")]
    ApplyFailed(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from fleetform-core.
    #[error("{0}")]
    Core(#[from] FleetformError),

    /// Wrapped reconciler error (observe, connect).
    #[error("{0}")]
    Reconcile(#[from] ReconcileError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success                              |
    /// | 1    | General / command error              |
    /// | 2    | Configuration error                  |
    /// | 3    | Docker daemon unreachable            |
    /// | 4    | Apply finished with failed tasks     |
    /// | 10   | IO error                             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(FleetformError::Config(_)) => 2,
            Self::Reconcile(ReconcileError::DockerConnection(_)) => 3,
            Self::Reconcile(ReconcileError::Config { .. }) => 2,
            Self::ApplyFailed(_) => 4,
            Self::Io(_) | Self::Core(FleetformError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Reconcile(_) => 1,
        }
    }
}
