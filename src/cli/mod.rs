//! CLI module for clipkun
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{ConfigOverrides, LogFormat};

pub mod args;
pub mod commands;
pub mod repl;

/// clipkun - mark an in-point and an out-point, get a stream-copied clip
#[derive(Parser, Debug)]
#[command(name = "clipkun")]
#[command(about = "Cut a clip out of a video without re-encoding")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Config file (default: ./clipkun.toml, then the user config dir)
    #[arg(long, global = true, env = "CLIPKUN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Engine binary
    #[arg(long, global = true)]
    pub engine: Option<PathBuf>,

    /// Directory for trimmed clips
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Replace existing output files
    #[arg(long, global = true)]
    pub overwrite: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cut one clip and exit
    Trim(args::TrimArgs),
    /// Open an interactive session reading commands from stdin
    Session(args::SessionArgs),
}

impl Cli {
    /// Command-line layer of the configuration hierarchy
    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            engine_path: self.engine.clone(),
            output_dir: self.output_dir.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format,
            overwrite: self.overwrite.then_some(true),
        }
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse().map_err(|e: crate::domain::errors::DomainError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "clipkun",
            "trim",
            "--input",
            "a.mp4",
            "--from",
            "1",
            "--to",
            "2",
            "--engine",
            "/opt/ffmpeg",
            "--log-format",
            "json",
        ])
        .unwrap();

        let overrides = cli.config_overrides();
        assert_eq!(overrides.engine_path, Some(PathBuf::from("/opt/ffmpeg")));
        assert_eq!(overrides.log_format, Some(LogFormat::Json));
        assert_eq!(overrides.overwrite, None);
    }

    #[test]
    fn test_trim_requires_bounds() {
        assert!(Cli::try_parse_from(["clipkun", "trim", "--input", "a.mp4"]).is_err());
    }
}
