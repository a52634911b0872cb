// TOML config adapter - Configuration loaded from a TOML file and environment

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::domain::errors::*;
use crate::ports::*;

const CONFIG_FILE_NAME: &str = "clipkun.toml";

/// Environment variables and the config key each one overrides
const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("CLIPKUN_ENGINE", "engine_path"),
    ("CLIPKUN_OUTPUT_DIR", "output_dir"),
    ("CLIPKUN_LOG_LEVEL", "log_level"),
    ("CLIPKUN_LOG_FORMAT", "log_format"),
    ("CLIPKUN_OVERWRITE", "overwrite"),
];

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    explicit_path: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl TomlConfigAdapter {
    /// Adapter reading the process environment
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        let env = ENV_MAPPINGS
            .iter()
            .filter_map(|(var, _)| std::env::var(var).ok().map(|v| (var.to_string(), v)))
            .collect();
        Self { explicit_path, env }
    }

    /// Adapter with a fixed environment, for tests
    pub fn with_env(explicit_path: Option<PathBuf>, env: HashMap<String, String>) -> Self {
        Self { explicit_path, env }
    }

    /// Candidate config files, most specific first
    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(dir).join("clipkun").join("config.toml"));
        } else if let Some(home) = std::env::var_os("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("clipkun")
                    .join("config.toml"),
            );
        }
        paths
    }

    fn read_file(path: &Path) -> Result<AppConfig, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            DomainError::Config(format!("Failed to parse TOML config {}: {}", path.display(), e))
        })
    }

    fn file_layer(&self) -> Result<AppConfig, DomainError> {
        if let Some(path) = &self.explicit_path {
            info!("Loading configuration from: {}", path.display());
            return Self::read_file(path);
        }

        for path in Self::candidate_paths() {
            if path.is_file() {
                info!("Loading configuration from: {}", path.display());
                return Self::read_file(&path);
            }
        }

        debug!("No config file found, using defaults");
        Ok(AppConfig::default())
    }

    fn apply_env(&self, mut config: AppConfig) -> Result<AppConfig, DomainError> {
        for (var, key) in ENV_MAPPINGS {
            let Some(value) = self.env.get(*var) else {
                continue;
            };
            debug!("Environment override: {} -> {}", var, key);
            match *key {
                "engine_path" => config.engine_path = PathBuf::from(value),
                "output_dir" => config.output_dir = Some(PathBuf::from(value)),
                "log_level" => config.log_level = value.clone(),
                "log_format" => config.log_format = value.parse()?,
                "overwrite" => {
                    config.overwrite = parse_bool(value).ok_or_else(|| {
                        DomainError::Config(format!("Invalid boolean value for {}: {}", var, value))
                    })?
                }
                _ => {}
            }
        }
        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ConfigPort for TomlConfigAdapter {
    fn load(&self) -> Result<AppConfig, DomainError> {
        let config = self.file_layer()?;
        self.apply_env(config)
    }
}
