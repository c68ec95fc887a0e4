//! Configuration for the jaqal CLI.
//!
//! Supports loading configuration from:
//! 1. A YAML file given with `--config`, or `~/.jaqal/config.yaml` if present
//! 2. Environment variables (with JAQAL_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line flags
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Scheduler configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when no `-v` flag is given: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Run the verification pass after scheduling
    #[serde(default = "default_true")]
    pub verify: bool,

    /// Native gate table file (YAML or JSON); the QSCOUT table when unset
    #[serde(default)]
    pub native_gates: Option<PathBuf>,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format for `schedule`: "jaqal" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> String {
    "jaqal".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            verify: default_true(),
            native_gates: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: default_format(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;

        let config: Config = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// Default configuration file location (`~/.jaqal/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".jaqal").join("config.yaml"))
    }

    /// Load configuration with the following precedence:
    /// 1. Load from `config_file` if provided, else from the default path if it exists
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(path)?,
                None => Config::default(),
            },
        };

        config = config.merge_env();

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Apply `JAQAL_*` overrides looked up through `var`.
    ///
    /// Only variables that are set override the current values.
    fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = var("JAQAL_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = var("JAQAL_NATIVE_GATES") {
            self.scheduler.native_gates = Some(PathBuf::from(v));
        }
        if let Some(v) = var("JAQAL_VERIFY") {
            if let Some(val) = parse_bool(&v) {
                self.scheduler.verify = val;
            }
        }
        if let Some(v) = var("JAQAL_FORMAT") {
            self.output.format = v;
        }

        self
    }

    /// Reject unknown log levels and output formats.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        match self.output.format.as_str() {
            "jaqal" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Unknown output format: {other}"
                )));
            }
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.logging.level, "warn");
        assert!(config.scheduler.verify);
        assert!(config.scheduler.native_gates.is_none());
        assert_eq!(config.output.format, "jaqal");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml_ng::from_str("scheduler:\n  verify: false\n").unwrap();
        assert!(!config.scheduler.verify);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.output.format, "jaqal");
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut config = Config::default();
        config.output.format = "qasm".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("JAQAL_LOG_LEVEL", "debug"),
            ("JAQAL_NATIVE_GATES", "/tmp/gates.yaml"),
            ("JAQAL_VERIFY", "off"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().merge_vars(|k| vars.get(k).map(|v| (*v).to_string()));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.scheduler.native_gates.as_deref(),
            Some(Path::new("/tmp/gates.yaml"))
        );
        assert!(!config.scheduler.verify);
        assert_eq!(config.output.format, "jaqal");
    }

    #[test]
    fn test_unparseable_bool_is_ignored() {
        let config = Config::default().merge_vars(|k| (k == "JAQAL_VERIFY").then(|| "maybe".into()));
        assert!(config.scheduler.verify);
    }
}
