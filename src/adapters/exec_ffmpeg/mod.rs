//! FFmpeg execution adapter
//!
//! Runs an ffmpeg binary as the media engine. Each engine instance owns a
//! private temporary directory that plays the role of the engine's virtual
//! filesystem: inputs are written into it by bare name, the binary runs
//! with that directory as its working directory, and outputs are read back
//! by name.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, trace, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::EngineArgs;
use crate::ports::*;

/// Flags placed before the caller's arguments on every run
const BASE_ARGS: &[&str] = &["-hide_banner", "-nostdin", "-y"];

/// stderr lines kept for error reports
const STDERR_TAIL_LINES: usize = 20;

/// FFmpeg-based engine adapter
pub struct FfmpegEngine {
    binary: PathBuf,
    workdir: TempDir,
    loaded: AtomicBool,
    progress: Mutex<Option<Arc<dyn ProgressCallback>>>,
}

impl FfmpegEngine {
    /// Create an engine for `binary` with a fresh working directory
    pub fn new(binary: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let workdir = tempfile::Builder::new()
            .prefix("clipkun-")
            .tempdir()
            .map_err(|e| DomainError::FsFail(format!("Failed to create engine directory: {}", e)))?;

        Ok(Self {
            binary: absolute_binary(binary.into())?,
            workdir,
            loaded: AtomicBool::new(false),
            progress: Mutex::new(None),
        })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Map a bare engine file name into the working directory
    fn resolve(&self, name: &str) -> Result<PathBuf, DomainError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(DomainError::BadArgs(format!(
                "Engine file names must be bare names, got '{}'",
                name
            )));
        }
        Ok(self.workdir.path().join(name))
    }

    /// Feed stderr lines to `parser`, keeping the last lines in `tail`
    async fn drain_stderr<R>(
        &self,
        mut stderr: R,
        parser: &mut ProgressParser,
        tail: &mut VecDeque<String>,
    ) -> Result<(), DomainError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = [0u8; 4096];
        let mut pending: Vec<u8> = Vec::new();
        loop {
            let n = stderr
                .read(&mut buf)
                .await
                .map_err(|e| DomainError::EngineFailed(format!("Failed to read engine output: {}", e)))?;
            if n == 0 {
                return Ok(());
            }
            pending.extend_from_slice(&buf[..n]);

            // ffmpeg ends stats lines with \r, everything else with \n
            while let Some(pos) = pending.iter().position(|b| *b == b'\r' || *b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line[..line.len() - 1]).trim().to_string();
                if line.is_empty() {
                    continue;
                }
                trace!("[engine] {}", line);
                if let Some(progress) = parser.feed(&line) {
                    self.report(progress);
                }
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }
    }

    fn report(&self, progress: Progress) {
        let callback = self.progress.lock().ok().and_then(|guard| guard.clone());
        if let Some(callback) = callback {
            callback.on_progress(progress);
        }
    }
}

#[async_trait]
impl EnginePort for FfmpegEngine {
    async fn load(&self) -> Result<(), DomainError> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(());
        }

        debug!("Probing engine binary: {}", self.binary.display());
        let status = Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                DomainError::EngineUnavailable(format!("{}: {}", self.binary.display(), e))
            })?;

        if !status.success() {
            return Err(DomainError::EngineUnavailable(format!(
                "{} -version exited with {}",
                self.binary.display(),
                status
            )));
        }

        self.loaded.store(true, Ordering::Release);
        info!("Engine loaded: {}", self.binary.display());
        Ok(())
    }

    fn set_progress(&self, callback: Arc<dyn ProgressCallback>) {
        if let Ok(mut slot) = self.progress.lock() {
            *slot = Some(callback);
        }
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), DomainError> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to write engine file {}: {}", name, e)))?;
        trace!("Engine file written: {} ({} bytes)", name, data.len());
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        let path = self.resolve(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to read engine file {}: {}", name, e)))
    }

    async fn remove_file(&self, name: &str) -> Result<(), DomainError> {
        let path = self.resolve(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::FsFail(format!(
                "Failed to remove engine file {}: {}",
                name, e
            ))),
        }
    }

    async fn run(&self, args: &[String]) -> Result<(), DomainError> {
        if !self.loaded.load(Ordering::Acquire) {
            return Err(DomainError::EngineUnavailable("engine not loaded".to_string()));
        }

        info!("Running engine: {} {}", self.binary.display(), args.join(" "));
        let mut child = Command::new(&self.binary)
            .args(BASE_ARGS)
            .args(args)
            .current_dir(self.workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DomainError::EngineUnavailable(format!("{}: {}", self.binary.display(), e))
            })?;

        let mut parser = ProgressParser::new(EngineArgs::clip_length(args));
        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

        if let Some(stderr) = child.stderr.take() {
            if let Err(e) = self.drain_stderr(stderr, &mut parser, &mut tail).await {
                if let Err(kill_err) = child.kill().await {
                    warn!("Failed to stop engine: {}", kill_err);
                }
                return Err(e);
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DomainError::EngineFailed(format!("Failed to wait for engine: {}", e)))?;

        if !status.success() {
            let tail: Vec<String> = tail.into_iter().collect();
            warn!("Engine exited with {}", status);
            return Err(DomainError::EngineFailed(format!(
                "exit status {}: {}",
                status.code().map_or_else(|| "signal".to_string(), |c| c.to_string()),
                tail.join("\n")
            )));
        }

        self.report(Progress::new(1.0));
        Ok(())
    }
}

/// Runs happen inside the working directory, so a relative path with a
/// directory part is pinned to the current directory up front. Bare names
/// are left for the PATH lookup.
fn absolute_binary(binary: PathBuf) -> Result<PathBuf, DomainError> {
    let has_dir = binary
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty());
    if binary.is_absolute() || !has_dir {
        return Ok(binary);
    }
    let cwd = std::env::current_dir().map_err(|e| {
        DomainError::EngineUnavailable(format!("{}: {}", binary.display(), e))
    })?;
    Ok(cwd.join(binary))
}

/// Turns ffmpeg stderr lines into progress ratios
#[derive(Debug, Clone)]
pub(crate) struct ProgressParser {
    total: Option<f64>,
}

impl ProgressParser {
    /// `clip_length` wins over the input's `Duration:` line
    pub(crate) fn new(clip_length: Option<f64>) -> Self {
        Self {
            total: clip_length.filter(|t| *t > 0.0),
        }
    }

    pub(crate) fn feed(&mut self, line: &str) -> Option<Progress> {
        if self.total.is_none() {
            if let Some(duration) = field_after(line, "Duration: ").and_then(parse_clock) {
                if duration > 0.0 {
                    self.total = Some(duration);
                }
                return None;
            }
        }

        let time = field_after(line, "time=").and_then(parse_clock)?;
        let total = self.total?;
        Some(Progress::new(time / total))
    }
}

/// Token following `key`, up to whitespace or a comma
fn field_after<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let start = line.find(key)? + key.len();
    let rest = &line[start..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == ',')
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn parse_clock(value: &str) -> Option<f64> {
    if value.starts_with('-') {
        return Some(0.0);
    }
    TimeSpec::parse(value).ok().map(|t| t.as_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS_LINE: &str =
        "frame=  120 fps=0.0 q=-1.0 size=     512kB time=00:00:05.00 bitrate= 838.9kbits/s speed=  10x";

    #[test]
    fn test_progress_uses_clip_length() {
        let mut parser = ProgressParser::new(Some(10.0));
        let progress = parser.feed(STATS_LINE).unwrap();
        assert_eq!(progress.ratio(), 0.5);
    }

    #[test]
    fn test_progress_falls_back_to_input_duration() {
        let mut parser = ProgressParser::new(None);
        assert!(parser.feed(STATS_LINE).is_none());
        assert!(parser
            .feed("  Duration: 00:00:20.00, start: 0.000000, bitrate: 1000 kb/s")
            .is_none());
        assert_eq!(parser.feed(STATS_LINE).unwrap().ratio(), 0.25);
    }

    #[test]
    fn test_progress_ignores_unavailable_time() {
        let mut parser = ProgressParser::new(Some(4.0));
        assert!(parser.feed("size=N/A time=N/A bitrate=N/A").is_none());
        assert!(parser.feed("Stream mapping:").is_none());
    }

    #[test]
    fn test_progress_clamps_overshoot() {
        let mut parser = ProgressParser::new(Some(2.0));
        assert_eq!(parser.feed(STATS_LINE).unwrap().ratio(), 1.0);
    }

    #[test]
    fn test_resolve_rejects_paths() {
        let engine = FfmpegEngine::new("ffmpeg").unwrap();
        assert!(engine.resolve("clip.mp4").is_ok());
        assert!(engine.resolve("../clip.mp4").is_err());
        assert!(engine.resolve("..").is_err());
        assert!(engine.resolve("").is_err());
    }

    #[tokio::test]
    async fn test_working_filesystem_round_trip() {
        let engine = FfmpegEngine::new("ffmpeg").unwrap();
        engine.write_file("in.mp4", b"data").await.unwrap();
        assert_eq!(engine.read_file("in.mp4").await.unwrap(), b"data");
        engine.remove_file("in.mp4").await.unwrap();
        assert!(engine.read_file("in.mp4").await.is_err());
        engine.remove_file("in.mp4").await.unwrap();
    }

    #[tokio::test]
    async fn test_run_requires_load() {
        let engine = FfmpegEngine::new("ffmpeg").unwrap();
        let err = engine.run(&["-version".to_string()]).await.unwrap_err();
        assert!(matches!(err, DomainError::EngineUnavailable(_)));
    }

    #[tokio::test]
    async fn test_load_reports_missing_binary() {
        let engine = FfmpegEngine::new("/nonexistent/clipkun-test-ffmpeg").unwrap();
        let err = engine.load().await.unwrap_err();
        assert!(matches!(err, DomainError::EngineUnavailable(_)));
    }

    #[test]
    fn test_relative_binary_is_pinned_to_current_dir() {
        let cwd = std::env::current_dir().unwrap();
        let engine = FfmpegEngine::new("bin/ffmpeg").unwrap();
        assert_eq!(engine.binary(), cwd.join("bin/ffmpeg"));

        let engine = FfmpegEngine::new("ffmpeg").unwrap();
        assert_eq!(engine.binary(), Path::new("ffmpeg"));

        let engine = FfmpegEngine::new("/usr/bin/ffmpeg").unwrap();
        assert_eq!(engine.binary(), Path::new("/usr/bin/ffmpeg"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_relative_binary_runs_from_working_dir() {
        use std::os::unix::fs::PermissionsExt;

        // Created under the current directory so the path stays relative
        let dir = TempDir::new_in(".").unwrap();
        let script = dir.path().join("fake-ffmpeg");
        assert!(script.is_relative());
        std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let engine = FfmpegEngine::new(&script).unwrap();
        engine.load().await.unwrap();
        engine.run(&["-version".to_string()]).await.unwrap();
    }

    struct BrokenPipe;

    impl AsyncRead for BrokenPipe {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "pipe closed",
            )))
        }
    }

    #[tokio::test]
    async fn test_stderr_read_failure_is_engine_failure() {
        let engine = FfmpegEngine::new("ffmpeg").unwrap();
        let mut parser = ProgressParser::new(Some(1.0));
        let mut tail = VecDeque::new();
        let err = engine
            .drain_stderr(BrokenPipe, &mut parser, &mut tail)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EngineFailed(_)));
    }

    #[tokio::test]
    async fn test_stderr_lines_split_on_carriage_returns() {
        let engine = FfmpegEngine::new("ffmpeg").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_callback = Arc::clone(&seen);
        engine.set_progress(Arc::new(move |p: Progress| {
            seen_in_callback.lock().unwrap().push(p.ratio());
        }));

        let output: &[u8] = b"Stream mapping:\ntime=00:00:01.00 \rtime=00:00:02.00 \rdone\n";
        let mut parser = ProgressParser::new(Some(4.0));
        let mut tail = VecDeque::new();
        engine.drain_stderr(output, &mut parser, &mut tail).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0.25, 0.5]);
        assert_eq!(tail.back().map(String::as_str), Some("done"));
        assert_eq!(tail.len(), 4);
    }
}
