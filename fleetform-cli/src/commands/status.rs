//! `fleetform status` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use fleetform_reconciler::{ResourceStatus, SyncState};

use crate::commands::{connect, load_config};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `status` command.
pub async fn execute(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let config = load_config(config_path).await?;
    let reconciler = connect(&config).await?;

    let resources = reconciler.status(&config.containers).await?;
    debug!(resources = resources.len(), "status computed");

    writer.render(&StatusReport::new(config.reconcile.prefix.clone(), resources))?;
    Ok(())
}

/// Status output.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Namespace prefix of managed resources
    pub prefix: String,
    /// True when every resource is in sync
    pub in_sync: bool,
    /// Per-resource state (containers first)
    pub resources: Vec<ResourceStatus>,
}

impl StatusReport {
    pub fn new(prefix: String, resources: Vec<ResourceStatus>) -> Self {
        let in_sync = resources.iter().all(|r| r.state == SyncState::InSync);
        Self {
            prefix,
            in_sync,
            resources,
        }
    }
}

impl Render for StatusReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Managed resources (prefix: {})", self.prefix.bold())?;
        writeln!(w)?;

        if self.resources.is_empty() {
            writeln!(w, "{}", "Nothing configured and nothing managed.".dimmed())?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<10} {:<30} {:<10} Fingerprint (desired / observed)",
            "Kind", "Name", "State"
        )?;
        writeln!(w, "{}", "-".repeat(90))?;

        for r in &self.resources {
            let state = r.state.to_string();
            let state_colored = match r.state {
                SyncState::InSync => state.green(),
                SyncState::Drifted => state.yellow(),
                SyncState::Missing => state.cyan(),
                SyncState::Orphaned => state.red(),
            };
            let fingerprints = match (&r.desired_fingerprint, &r.observed_fingerprint) {
                (None, None) => String::new(),
                (desired, observed) => format!(
                    "{} / {}",
                    desired.as_deref().unwrap_or("-"),
                    observed.as_deref().filter(|f| !f.is_empty()).unwrap_or("-")
                ),
            };

            writeln!(
                w,
                "{:<10} {:<30} {:<10} {}",
                r.kind.to_string(),
                r.name,
                state_colored,
                fingerprints.dimmed()
            )?;
        }

        writeln!(w)?;
        if self.in_sync {
            writeln!(w, "{}", "All resources in sync.".green())?;
        } else {
            let pending = self
                .resources
                .iter()
                .filter(|r| r.state != SyncState::InSync)
                .count();
            writeln!(
                w,
                "{} resource(s) need changes. Run `fleetform plan` for details.",
                pending.to_string().yellow().bold()
            )?;
        }

        Ok(())
    }
}
