//! `fleetform plan` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use fleetform_core::types::ObservedState;
use fleetform_reconciler::{Plan, PlannedCycle};

use crate::cli::PlanArgs;
use crate::commands::{connect, kind_marker, load_config, renew_request};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `plan` command.
pub async fn execute(
    args: PlanArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config(config_path).await?;
    let reconciler = connect(&config).await?;

    let planned = reconciler
        .plan(&config.containers, &renew_request(&args.renew))
        .await?;

    writer.render(&PlanReport::from_cycle(planned, false))?;
    Ok(())
}

/// Plan output, shared with `apply --dry-run`.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    /// Cycle identifier
    pub cycle_id: String,
    /// True when produced by `apply --dry-run`
    pub dry_run: bool,
    /// Managed resources seen on the host
    pub observed: ObservedState,
    /// Number of tasks across all stages
    pub task_count: usize,
    /// Ordered stages
    pub stages: Plan,
}

impl PlanReport {
    pub fn from_cycle(cycle: PlannedCycle, dry_run: bool) -> Self {
        Self {
            cycle_id: cycle.cycle_id.to_string(),
            dry_run,
            observed: cycle.observed,
            task_count: cycle.plan.task_count(),
            stages: cycle.plan,
        }
    }
}

impl Render for PlanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let title = if self.dry_run { "Plan (dry run)" } else { "Plan" };
        writeln!(w, "{} {}", title.bold(), self.cycle_id.dimmed())?;
        writeln!(
            w,
            "  Observed: {} container(s), {} network(s)",
            self.observed.containers.len(),
            self.observed.networks.len()
        )?;
        writeln!(w)?;

        if self.stages.is_empty() {
            writeln!(w, "{}", "No changes. The host matches the configuration.".green())?;
            return Ok(());
        }

        for (index, stage) in self.stages.stages().iter().enumerate() {
            writeln!(w, "Stage {} ({} task(s))", index, stage.len())?;
            for task in stage.tasks() {
                writeln!(w, "  {} {}", kind_marker(task.kind()), task)?;
            }
        }

        writeln!(w)?;
        writeln!(
            w,
            "{} task(s) in {} stage(s)",
            self.task_count.to_string().bold(),
            self.stages.len()
        )?;

        Ok(())
    }
}
