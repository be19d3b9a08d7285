//! `fleetform apply` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use fleetform_reconciler::{AppliedCycle, ApplyReport, TaskStatus};

use crate::cli::ApplyArgs;
use crate::commands::plan::PlanReport;
use crate::commands::{connect, kind_marker, load_config, renew_request};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `apply` command.
///
/// With `--dry-run` the plan is rendered exactly like `fleetform plan` and
/// nothing is executed. Otherwise the report is rendered first and
/// `CliError::ApplyFailed` is returned when any task failed, so the process
/// exits with code 4 after printing what happened.
pub async fn execute(
    args: ApplyArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config(config_path).await?;
    let reconciler = connect(&config).await?;
    let renew = renew_request(&args.renew);

    if args.dry_run {
        let planned = reconciler.plan(&config.containers, &renew).await?;
        writer.render(&PlanReport::from_cycle(planned, true))?;
        return Ok(());
    }

    let applied = reconciler.apply(&config.containers, &renew).await?;
    let result = ApplyResult::from_cycle(applied);
    writer.render(&result)?;

    if !result.report.is_success() {
        for failure in result.report.failures() {
            warn!(
                task = %failure.task,
                error = failure.error.as_deref().unwrap_or(""),
                "task failed"
            );
        }
        return Err(CliError::ApplyFailed(result.report.to_string()));
    }

    Ok(())
}

/// Apply output.
#[derive(Debug, Serialize)]
pub struct ApplyResult {
    /// Cycle identifier
    pub cycle_id: String,
    /// Number of planned tasks
    pub planned_tasks: usize,
    /// True when every planned task succeeded
    pub success: bool,
    /// Per-stage outcomes
    pub report: ApplyReport,
}

impl ApplyResult {
    pub fn from_cycle(cycle: AppliedCycle) -> Self {
        Self {
            cycle_id: cycle.cycle_id.to_string(),
            planned_tasks: cycle.plan.task_count(),
            success: cycle.report.is_success(),
            report: cycle.report,
        }
    }
}

impl Render for ApplyResult {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{} {}", "Apply".bold(), self.cycle_id.dimmed())?;
        writeln!(w)?;

        if self.planned_tasks == 0 {
            writeln!(w, "{}", "No changes. The host matches the configuration.".green())?;
            return Ok(());
        }

        for stage in &self.report.stages {
            writeln!(w, "Stage {}", stage.index)?;
            for outcome in &stage.outcomes {
                let status = match outcome.status {
                    TaskStatus::Succeeded => "ok".green(),
                    TaskStatus::Failed => "FAILED".red().bold(),
                };
                writeln!(
                    w,
                    "  {} {:<50} {} ({}ms)",
                    kind_marker(outcome.task.kind()),
                    outcome.task.to_string(),
                    status,
                    outcome.elapsed_ms
                )?;
                if let Some(error) = &outcome.error {
                    writeln!(w, "      {}", error.red())?;
                }
            }
        }

        writeln!(w)?;
        let summary = self.report.to_string();
        if self.success {
            writeln!(w, "Result: {} ({})", "CONVERGED".green().bold(), summary)?;
        } else {
            writeln!(w, "Result: {} ({})", "INCOMPLETE".red().bold(), summary)?;
            writeln!(
                w,
                "{}",
                "Run `fleetform apply` again to retry the remaining changes.".dimmed()
            )?;
        }

        Ok(())
    }
}
