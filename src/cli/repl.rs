//! Line-oriented driver for an interactive session

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::app::progress::ConsoleProgress;
use crate::app::session::{SessionStatus, TrimSession};
use crate::domain::errors::DomainError;
use crate::domain::model::TimeSpec;
use crate::domain::rules::ProgressDisplay;
use crate::ports::ProgressCallback;

const HELP: &str = "\
commands:
  open <path>    select a video
  seek <time>    move the playback position
  from [time]    set the in-point (at <time>, or the current position)
  to [time]      set the out-point (at <time>, or the current position)
  status         show the current state (status json for JSON)
  trim           cut the clip
  close          dismiss the result
  reset          start over
  help           show this text
  quit           leave the session";

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Open(PathBuf),
    Seek(TimeSpec),
    From(Option<TimeSpec>),
    To(Option<TimeSpec>),
    Status { json: bool },
    Trim,
    Close,
    Reset,
    Help,
    Quit,
}

impl SessionCommand {
    /// `Ok(None)` for blank lines and comments
    pub fn parse(line: &str) -> Result<Option<Self>, DomainError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let optional_time = |rest: &str| -> Result<Option<TimeSpec>, DomainError> {
            if rest.is_empty() {
                Ok(None)
            } else {
                TimeSpec::parse(rest).map(Some)
            }
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "open" => {
                if rest.is_empty() {
                    return Err(DomainError::BadArgs("usage: open <path>".to_string()));
                }
                SessionCommand::Open(PathBuf::from(rest))
            }
            "seek" => SessionCommand::Seek(TimeSpec::parse(rest)?),
            "from" => SessionCommand::From(optional_time(rest)?),
            "to" => SessionCommand::To(optional_time(rest)?),
            "status" => SessionCommand::Status {
                json: rest.eq_ignore_ascii_case("json"),
            },
            "trim" => SessionCommand::Trim,
            "close" => SessionCommand::Close,
            "reset" => SessionCommand::Reset,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            other => {
                return Err(DomainError::BadArgs(format!(
                    "unknown command '{}', try 'help'",
                    other
                )))
            }
        };
        Ok(Some(command))
    }
}

/// Feed lines from `input` to `session` until EOF or `quit`
pub async fn run_session<R, W>(session: &TrimSession, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match SessionCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "alert: {}", e)?;
                continue;
            }
        };
        debug!("Session command: {:?}", command);
        if command == SessionCommand::Quit {
            break;
        }
        if let Err(e) = execute(session, command, out).await {
            match e.downcast_ref::<DomainError>() {
                Some(domain) => writeln!(out, "alert: {}", domain)?,
                None => return Err(e),
            }
        }
        out.flush()?;
    }
    Ok(())
}

async fn execute<W: Write>(
    session: &TrimSession,
    command: SessionCommand,
    out: &mut W,
) -> Result<()> {
    match command {
        SessionCommand::Open(path) => {
            let url = session.select_file(&path).await?;
            writeln!(out, "opened {} as {}", path.display(), url)?;
        }
        SessionCommand::Seek(time) => {
            session.seek(time)?;
            writeln!(out, "position {}", time)?;
        }
        SessionCommand::From(time) => {
            let range = match time {
                Some(time) => session.set_from(time)?,
                None => session.mark_from()?,
            };
            writeln!(out, "{}", ProgressDisplay::range_summary(&range))?;
        }
        SessionCommand::To(time) => {
            let range = match time {
                Some(time) => session.set_to(time)?,
                None => session.mark_to()?,
            };
            writeln!(out, "{}", ProgressDisplay::range_summary(&range))?;
        }
        SessionCommand::Status { json } => {
            let status = session.status();
            if json {
                writeln!(out, "{}", serde_json::to_string(&status)?)?;
            } else {
                write_status(out, &status)?;
            }
        }
        SessionCommand::Trim => {
            writeln!(out, "Converting...")?;
            out.flush()?;
            let console = Arc::new(ConsoleProgress::new("converting"));
            let listener: Arc<dyn ProgressCallback> = console.clone();
            session.add_progress_listener(Arc::clone(&listener));
            let submitted = session.submit().await;
            session.remove_progress_listener(&listener);
            let result = match submitted {
                Ok(result) => {
                    console.finish("done");
                    result
                }
                Err(e) => {
                    console.abandon();
                    return Err(e.into());
                }
            };
            writeln!(
                out,
                "result {}: {} ({} bytes, {})",
                result.url,
                result.output_path.display(),
                result.size,
                result.mime_type
            )?;
        }
        SessionCommand::Close => {
            if session.dismiss_result()? {
                writeln!(out, "result closed")?;
            } else {
                writeln!(out, "no result to close")?;
            }
        }
        SessionCommand::Reset => {
            session.reset()?;
            writeln!(out, "reset")?;
        }
        SessionCommand::Help => writeln!(out, "{}", HELP)?,
        SessionCommand::Quit => {}
    }
    Ok(())
}

fn write_status<W: Write>(out: &mut W, status: &SessionStatus) -> std::io::Result<()> {
    match (&status.file, &status.preview_url) {
        (Some(file), Some(url)) => writeln!(out, "file: {} ({})", file, url)?,
        (Some(file), None) => writeln!(out, "file: {}", file)?,
        _ => writeln!(out, "file: none")?,
    }
    writeln!(out, "position: {}", TimeSpec::from_seconds(status.position))?;
    writeln!(out, "{}", status.summary)?;
    if let Some(line) = &status.status_line {
        writeln!(out, "{}", line)?;
    }
    if let Some(result) = &status.result {
        writeln!(
            out,
            "result: {} -> {} ({} bytes)",
            result.url,
            result.output_path.display(),
            result.size
        )?;
    }
    Ok(())
}
