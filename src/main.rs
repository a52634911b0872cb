//! clipkun
//!
//! Marks an in-point and an out-point on a local video and cuts the span
//! out as a stream-copied clip. All media work is delegated to an external
//! ffmpeg binary.
//!
//! # Usage
//!
//! ```bash
//! clipkun trim --input video.mp4 --from 1:05 --to 1:42.5
//! clipkun trim --input video.mp4 --from 12 --to 20 --dry-run
//! clipkun session --input video.mp4
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use clipkun_cli::adapters::init_logging;
use clipkun_cli::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(&cli)?;

    init_logging(&config.log_level, config.log_format)?;
    info!("Starting clipkun");

    match cli.command {
        Commands::Trim(args) => {
            info!("Executing trim command");
            commands::trim(config, args).await?;
        }
        Commands::Session(args) => {
            info!("Executing session command");
            commands::session(config, args).await?;
        }
    }

    info!("clipkun completed successfully");
    Ok(())
}
