//! End-to-end tests of the clipkun binary that never reach the engine

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("movie.mp4"), b"fake video data").unwrap();
        Self { dir }
    }

    fn video(&self) -> String {
        self.dir.path().join("movie.mp4").display().to_string()
    }

    /// Binary isolated from any config file or CLIPKUN_* variable on the host
    fn clipkun(&self) -> Command {
        let mut cmd = Command::cargo_bin("clipkun").unwrap();
        cmd.current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env_remove("CLIPKUN_CONFIG")
            .env_remove("CLIPKUN_ENGINE")
            .env_remove("CLIPKUN_OUTPUT_DIR")
            .env_remove("CLIPKUN_LOG_LEVEL")
            .env_remove("CLIPKUN_LOG_FORMAT")
            .env_remove("CLIPKUN_OVERWRITE")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn test_missing_input_fails_to_load() {
    let ws = Workspace::new();
    ws.clipkun()
        .args(["trim", "--input", "nope.mp4", "--from", "1", "--to", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load video"));
}

#[test]
fn test_equal_bounds_rejected() {
    let ws = Workspace::new();
    ws.clipkun()
        .args(["trim", "--input", &ws.video(), "--from", "5", "--to", "0:05"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("start and end points are the same"));
}

#[test]
fn test_inverted_bounds_rejected() {
    let ws = Workspace::new();
    ws.clipkun()
        .args(["trim", "--input", &ws.video(), "--from", "10", "--to", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("start point is after the end point"));
}

#[test]
fn test_invalid_time_rejected() {
    let ws = Workspace::new();
    ws.clipkun()
        .args(["trim", "--input", &ws.video(), "--from", "soon", "--to", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid start time"));
}

#[test]
fn test_dry_run_prints_engine_command() {
    let ws = Workspace::new();
    ws.clipkun()
        .args([
            "trim", "--input", &ws.video(), "--from", "12.5", "--to", "20", "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ffmpeg -ss 12.5 -i movie.mp4 -ss 0 -t 7.5 -c copy output.mp4",
        ))
        .stdout(predicate::str::contains("movie_trim_0m12s-0m20s.mp4"));
}

#[test]
fn test_dry_run_json() {
    let ws = Workspace::new();
    let output = ws
        .clipkun()
        .args([
            "trim", "--input", &ws.video(), "--from", "1:00", "--to", "1:30", "--dry-run", "--json",
            "--engine", "/opt/ffmpeg/bin/ffmpeg",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["engine"], "/opt/ffmpeg/bin/ffmpeg");
    assert_eq!(value["args"][1], "60");
    assert_eq!(value["args"][7], "30");
}

#[test]
fn test_config_file_sets_engine() {
    let ws = Workspace::new();
    std::fs::write(
        ws.dir.path().join("clipkun.toml"),
        "engine_path = \"/usr/local/bin/ffmpeg\"\n",
    )
    .unwrap();
    ws.clipkun()
        .args(["trim", "--input", &ws.video(), "--from", "0", "--to", "1", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("/usr/local/bin/ffmpeg -ss 0"));
}

#[test]
fn test_cli_flag_beats_env() {
    let ws = Workspace::new();
    ws.clipkun()
        .env("CLIPKUN_ENGINE", "/from/env/ffmpeg")
        .args([
            "trim", "--input", &ws.video(), "--from", "0", "--to", "1", "--dry-run",
            "--engine", "/from/flag/ffmpeg",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("/from/flag/ffmpeg"));
}

#[test]
fn test_session_alerts_and_continues() {
    let ws = Workspace::new();
    let script = format!(
        "trim\nopen {}\nfrom 1\nto 1\ntrim\nto 0.5\ntrim\nstatus\nquit\n",
        ws.video()
    );
    ws.clipkun()
        .arg("session")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("alert: Select a video first"))
        .stdout(predicate::str::contains("opened"))
        .stdout(predicate::str::contains("From: 0:1, To: 0:1 (Duration: 0s)"))
        .stdout(predicate::str::contains(
            "alert: Cannot trim: the start and end points are the same",
        ))
        .stdout(predicate::str::contains(
            "alert: Cannot trim: the start point is after the end point",
        ))
        .stdout(predicate::str::contains("file: movie.mp4"));
}

#[test]
fn test_session_unknown_command() {
    let ws = Workspace::new();
    ws.clipkun()
        .arg("session")
        .write_stdin("dance\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("alert: Bad arguments: unknown command 'dance'"));
}
