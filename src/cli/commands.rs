//! Command implementations

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::BufReader;
use tracing::info;

use crate::adapters::TomlConfigAdapter;
use crate::app::progress::ConsoleProgress;
use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::args::{SessionArgs, TrimArgs};
use crate::cli::repl;
use crate::cli::Cli;
use crate::config::AppConfig;
use crate::domain::model::TimeSpec;
use crate::ports::{ConfigPort, ProgressCallback};

/// Resolve the configuration hierarchy: CLI > env > file > defaults
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let adapter = TomlConfigAdapter::new(cli.config.clone());
    let config = adapter
        .load()
        .context("Failed to load configuration")?
        .apply_overrides(&cli.config_overrides());
    config.validate()?;
    Ok(config)
}

#[derive(Serialize)]
struct DryRun<'a> {
    engine: String,
    args: &'a [String],
    output_path: String,
}

/// Execute the trim command
pub async fn trim(config: AppConfig, args: TrimArgs) -> Result<()> {
    info!("Starting trim operation");
    info!("Input: {}", args.input.display());

    let from = TimeSpec::parse(&args.from)
        .with_context(|| format!("Invalid start time '{}'", args.from))?;
    let to = TimeSpec::parse(&args.to)
        .with_context(|| format!("Invalid end time '{}'", args.to))?;

    let engine = config.engine_path.clone();
    let container = DefaultAppContainer::new(config)?;
    let session = container.new_session();

    session.select_file(&args.input).await?;
    session.set_from(from)?;
    session.set_to(to)?;

    if args.dry_run {
        let (request, engine_args) = session.plan(args.output.clone())?;
        if args.json {
            let dry_run = DryRun {
                engine: engine.display().to_string(),
                args: &engine_args,
                output_path: request.output_path.display().to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&dry_run)?);
        } else {
            println!("{} {}", engine.display(), engine_args.join(" "));
            println!("-> {}", request.output_path.display());
        }
        return Ok(());
    }

    let console = Arc::new(if args.json {
        ConsoleProgress::hidden()
    } else {
        ConsoleProgress::new("trimming")
    });
    session.add_progress_listener(Arc::clone(&console) as Arc<dyn ProgressCallback>);

    let result = match session.submit_to(args.output.clone()).await {
        Ok(result) => {
            console.finish("done");
            result
        }
        Err(e) => {
            console.abandon();
            return Err(e).context("Trim failed");
        }
    };

    if args.json {
        let outcome = session
            .last_outcome()
            .context("Trim finished without a result")?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "Saved {} ({} bytes)",
            result.output_path.display(),
            result.size
        );
    }

    info!("Trim operation completed successfully");
    Ok(())
}

/// Execute the session command
pub async fn session(config: AppConfig, args: SessionArgs) -> Result<()> {
    info!("Starting interactive session");
    let container = DefaultAppContainer::new(config)?;
    let session = container.new_session();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Some(input) = &args.input {
        match session.select_file(input).await {
            Ok(url) => writeln!(out, "opened {} as {}", input.display(), url)?,
            Err(e) => writeln!(out, "alert: {}", e)?,
        }
    }

    let stdin = BufReader::new(tokio::io::stdin());
    repl::run_session(&session, stdin, &mut out).await?;

    info!("Session closed");
    Ok(())
}
