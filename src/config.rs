//! Configuration file support for image-lifecycle.
//!
//! Provides YAML-based configuration through `image-lifecycle.config.yml`
//! files, including data structures, file loading, validation, and the
//! merge of file values with command-line overrides.

use anyhow::{bail, Context};
use owo_colors::OwoColorize;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::dto::{OutputFormat, DEFAULT_ACTOR};
use crate::lifecycle::policies::{SlaPolicy, DEFAULT_PREMIUM_DAYS, DEFAULT_STANDARD_DAYS};
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "image-lifecycle.config.yml";

/// Environment variable overriding the database path
pub const DATABASE_ENV: &str = "IMAGE_LIFECYCLE_DATABASE";

pub const DEFAULT_DATABASE_PATH: &str = "image-lifecycle.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_ORCHESTRATOR_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 3600;
pub const DEFAULT_OPERATION_TIMEOUT_SECONDS: u64 = 30;

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub actor: Option<String>,
    pub format: Option<String>,
    pub orchestrator: Option<OrchestratorSection>,
    pub sla: Option<SlaSection>,
    pub operation_timeout_seconds: Option<u64>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OrchestratorSection {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SlaSection {
    pub premium_days: Option<u32>,
    pub standard_days: Option<u32>,
    pub sweep_interval_seconds: Option<u64>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

fn ensure_positive(field: &str, value: Option<u64>) -> Result<()> {
    if value == Some(0) {
        bail!(
            "Invalid config: {} must be greater than 0.\n\n💡 Hint: Remove the field to use the default.",
            field
        );
    }
    Ok(())
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    ensure_positive("operation_timeout_seconds", config.operation_timeout_seconds)?;

    if let Some(ref orchestrator) = config.orchestrator {
        ensure_positive("orchestrator.timeout_seconds", orchestrator.timeout_seconds)?;
        if let Some(ref endpoint) = orchestrator.endpoint {
            let endpoint = endpoint.trim();
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                bail!(
                    "Invalid config: orchestrator.endpoint must start with http:// or https://, got '{}'.",
                    endpoint
                );
            }
        }
    }

    if let Some(ref sla) = config.sla {
        ensure_positive("sla.premium_days", sla.premium_days.map(u64::from))?;
        ensure_positive("sla.standard_days", sla.standard_days.map(u64::from))?;
        ensure_positive("sla.sweep_interval_seconds", sla.sweep_interval_seconds)?;
    }

    if let Some(ref format) = config.format {
        if let Err(e) = format.parse::<OutputFormat>() {
            bail!("Invalid config: {}", e);
        }
    }

    if let Some(ref actor) = config.actor {
        if actor.trim().is_empty() {
            bail!("Invalid config: actor must not be empty.");
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
///
/// Printed directly because the config is loaded before logging starts.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!(
            "{} Unknown config field '{}' will be ignored.",
            "⚠️  Warning:".yellow(),
            key
        );
    }
}

/// Values given on the command line, which take precedence over the file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub log_level: String,
    pub actor: String,
    pub format: Option<OutputFormat>,
    pub orchestrator_endpoint: Option<String>,
    pub orchestrator_timeout: Duration,
    pub sla_policy: SlaPolicy,
    pub sweep_interval: Duration,
    pub operation_timeout: Duration,
}

impl Settings {
    /// Merges command-line overrides, the environment, and the config file
    ///
    /// Precedence per field: command line, then `IMAGE_LIFECYCLE_DATABASE`
    /// (database path only), then the file, then the built-in default.
    pub fn resolve(
        config: ConfigFile,
        overrides: Overrides,
        database_env: Option<String>,
    ) -> Self {
        let orchestrator = config.orchestrator.unwrap_or_default();
        let sla = config.sla.unwrap_or_default();

        let database_path = overrides
            .database_path
            .or_else(|| {
                database_env
                    .filter(|value| !value.trim().is_empty())
                    .map(PathBuf::from)
            })
            .or(config.database_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        Self {
            database_path,
            log_level: overrides
                .log_level
                .or(config.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            actor: config
                .actor
                .map(|actor| actor.trim().to_string())
                .unwrap_or_else(|| DEFAULT_ACTOR.to_string()),
            format: config.format.and_then(|format| format.parse().ok()),
            orchestrator_endpoint: orchestrator
                .endpoint
                .map(|endpoint| endpoint.trim().to_string()),
            orchestrator_timeout: Duration::from_secs(
                orchestrator
                    .timeout_seconds
                    .unwrap_or(DEFAULT_ORCHESTRATOR_TIMEOUT_SECONDS),
            ),
            sla_policy: SlaPolicy::new(
                sla.premium_days.unwrap_or(DEFAULT_PREMIUM_DAYS),
                sla.standard_days.unwrap_or(DEFAULT_STANDARD_DAYS),
            ),
            sweep_interval: Duration::from_secs(
                sla.sweep_interval_seconds
                    .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECONDS),
            ),
            operation_timeout: Duration::from_secs(
                config
                    .operation_timeout_seconds
                    .unwrap_or(DEFAULT_OPERATION_TIMEOUT_SECONDS),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            r#"
database_path: /var/lib/image-lifecycle/state.db
log_level: debug
actor: release-bot
format: markdown
orchestrator:
  endpoint: https://builder.internal
  timeout_seconds: 5
sla:
  premium_days: 3
  standard_days: 14
  sweep_interval_seconds: 600
operation_timeout_seconds: 45
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(
            config.database_path.as_deref(),
            Some(Path::new("/var/lib/image-lifecycle/state.db"))
        );
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.actor.as_deref(), Some("release-bot"));
        assert_eq!(config.format.as_deref(), Some("markdown"));
        let orchestrator = config.orchestrator.unwrap();
        assert_eq!(orchestrator.endpoint.as_deref(), Some("https://builder.internal"));
        assert_eq!(orchestrator.timeout_seconds, Some(5));
        let sla = config.sla.unwrap();
        assert_eq!(sla.premium_days, Some(3));
        assert_eq!(sla.standard_days, Some(14));
        assert_eq!(sla.sweep_interval_seconds, Some(600));
        assert_eq!(config.operation_timeout_seconds, Some(45));
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "log_level: warn\n").unwrap();

        let config = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        let config = discover_config(dir.path()).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/config.yml"));
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("bad.yml");
        fs::write(&config_path, "invalid: yaml: [[[broken").unwrap();

        let result = load_config_from_path(&config_path);
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_zero_duration_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "sla:\n  sweep_interval_seconds: 0\n").unwrap();

        let result = load_config_from_path(&config_path);
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("sla.sweep_interval_seconds must be greater than 0"));
    }

    #[test]
    fn test_invalid_endpoint_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "orchestrator:\n  endpoint: builder.internal\n").unwrap();

        let result = load_config_from_path(&config_path);
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("orchestrator.endpoint must start with http://"));
    }

    #[test]
    fn test_invalid_format_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "format: xml\n").unwrap();

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("Invalid format: xml"));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "log_level: info\ncheck_cve: true\n").unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.unknown_fields.len(), 1);
        assert!(config.unknown_fields.contains_key("check_cve"));
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::resolve(ConfigFile::default(), Overrides::default(), None);

        assert_eq!(settings.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.actor, "system");
        assert!(settings.orchestrator_endpoint.is_none());
        assert_eq!(settings.orchestrator_timeout, Duration::from_secs(10));
        assert_eq!(settings.sla_policy, SlaPolicy::default());
        assert_eq!(settings.sweep_interval, Duration::from_secs(3600));
        assert_eq!(settings.operation_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_resolve_database_precedence() {
        let file = || ConfigFile {
            database_path: Some(PathBuf::from("file.db")),
            ..ConfigFile::default()
        };

        let from_file = Settings::resolve(file(), Overrides::default(), None);
        assert_eq!(from_file.database_path, PathBuf::from("file.db"));

        let from_env = Settings::resolve(file(), Overrides::default(), Some("env.db".to_string()));
        assert_eq!(from_env.database_path, PathBuf::from("env.db"));

        let from_flag = Settings::resolve(
            file(),
            Overrides {
                database_path: Some(PathBuf::from("flag.db")),
                log_level: None,
            },
            Some("env.db".to_string()),
        );
        assert_eq!(from_flag.database_path, PathBuf::from("flag.db"));
    }
}
