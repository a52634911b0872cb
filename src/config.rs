//! Configuration model and hierarchy
//!
//! Precedence, highest first: CLI flags, environment, config file, defaults.
//! The file and environment layers are resolved by
//! [`TomlConfigAdapter`](crate::adapters::TomlConfigAdapter); CLI flags are
//! applied on top with [`AppConfig::apply_overrides`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::rules::DEFAULT_OUTPUT_NAME;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
    /// JSON format for structured logging
    Json,
}

impl FromStr for LogFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(DomainError::Config(format!(
                "Invalid log format: {}. Valid formats: pretty, compact, json",
                other
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Effective application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Engine binary, looked up on PATH when not absolute
    pub engine_path: PathBuf,
    /// Where trimmed clips go; the input's directory when unset
    pub output_dir: Option<PathBuf>,
    /// File name the engine writes inside its working directory
    pub output_name: String,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Replace an existing output file instead of failing
    pub overwrite: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine_path: PathBuf::from("ffmpeg"),
            output_dir: None,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            overwrite: false,
        }
    }
}

/// Values supplied on the command line; `None` leaves the lower layer alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub engine_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub overwrite: Option<bool>,
}

impl AppConfig {
    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(engine) = &overrides.engine_path {
            self.engine_path = engine.clone();
        }
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = Some(dir.clone());
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        if let Some(overwrite) = overrides.overwrite {
            self.overwrite = overwrite;
        }
        self
    }

    /// Reject values that would only fail later
    pub fn validate(&self) -> Result<(), DomainError> {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(DomainError::Config(format!(
                    "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                    other
                )))
            }
        }
        if self.output_name.is_empty() || self.output_name.contains(['/', '\\']) {
            return Err(DomainError::Config(format!(
                "output_name must be a bare file name, got '{}'",
                self.output_name
            )));
        }
        if self.engine_path.as_os_str().is_empty() {
            return Err(DomainError::Config("engine_path cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert_eq!(config.engine_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.output_name, "output.mp4");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let overrides = ConfigOverrides {
            log_level: Some("debug".to_string()),
            overwrite: Some(true),
            ..Default::default()
        };
        let config = AppConfig::default().apply_overrides(&overrides);
        assert_eq!(config.log_level, "debug");
        assert!(config.overwrite);
        assert_eq!(config.engine_path, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_level = AppConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(bad_level.validate().is_err());

        let bad_name = AppConfig {
            output_name: "out/put.mp4".to_string(),
            ..Default::default()
        };
        assert!(bad_name.validate().is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("overwrite = true\nlog_format = \"json\"").unwrap();
        assert!(config.overwrite);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.output_name, "output.mp4");
    }
}
