//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the trim command
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// In-point (seconds, MM:SS.ms or HH:MM:SS.ms)
    #[arg(short, long)]
    pub from: String,

    /// Out-point (seconds, MM:SS.ms or HH:MM:SS.ms)
    #[arg(short, long)]
    pub to: String,

    /// Output file path (default: derived from the input name and range)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the engine command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the session command
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Video to open on start
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}
