//! `fleetform config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use fleetform_core::config::FleetformConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Env var names containing any of these are masked by `config show`.
const SENSITIVE_KEY_PARTS: &[&str] = &["PASSWORD", "SECRET", "TOKEN", "API_KEY", "PRIVATE_KEY"];

const REDACTED: &str = "***REDACTED***";

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Execute the config validate subcommand.
///
/// Attempts to load and validate the configuration file, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (missing fields, invalid values, parse errors).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match FleetformConfig::load(config_path).await {
        Ok(config) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            containers: config.containers.len(),
            enabled: config.enabled_count(),
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            containers: 0,
            enabled: 0,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Execute the config show subcommand.
///
/// Loads and displays the effective configuration (file + env overrides + defaults).
/// Container environment values that look like credentials are redacted.
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if section name is invalid.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let mut config = FleetformConfig::load(config_path).await?;
    redact_credentials(&mut config);

    let report = build_config_report(&config, config_path, section)?;
    writer.render(&report)?;

    Ok(())
}

fn build_config_report(
    config: &FleetformConfig,
    config_path: &Path,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let serialized = match section.as_deref() {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("docker") => toml::to_string_pretty(&config.docker),
        Some("reconcile") => toml::to_string_pretty(&config.reconcile),
        Some("containers") => toml::to_string_pretty(&config.containers),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: general, docker, reconcile, containers)",
                other
            )));
        }
    };

    Ok(ConfigReport {
        source: config_path.display().to_string(),
        section,
        config_toml: serialized.unwrap_or_else(|e| format!("(serialization error: {})", e)),
    })
}

/// Redact credential-looking values from container environments.
///
/// A value is masked when its key names a secret, or when it is a URL
/// carrying `user:password@`.
fn redact_credentials(config: &mut FleetformConfig) {
    for plan in config.containers.values_mut() {
        for (key, value) in plan.env.iter_mut() {
            let upper = key.to_ascii_uppercase();
            if SENSITIVE_KEY_PARTS.iter().any(|part| upper.contains(part)) {
                *value = REDACTED.to_owned();
            } else {
                *value = redact_url(value);
            }
        }
    }
}

/// Redact credentials from a connection URL.
///
/// Preserves the scheme and host while replacing user:password with ***REDACTED***.
fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_owned();
    };
    let scheme = &url[..scheme_end + 3];
    let rest = &url[scheme_end + 3..];

    match (rest.find('@'), rest.find('/')) {
        (Some(at_pos), Some(slash_pos)) if at_pos < slash_pos => {
            format!("{}{}{}", scheme, REDACTED, &rest[at_pos..])
        }
        (Some(at_pos), None) => format!("{}{}{}", scheme, REDACTED, &rest[at_pos..]),
        _ => url.to_owned(),
    }
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration (with redacted credentials)
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Declared containers
    pub containers: usize,
    /// Declared containers with `enabled = true`
    pub enabled: usize,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
            writeln!(
                w,
                "  Containers: {} declared, {} enabled",
                self.containers, self.enabled
            )?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
