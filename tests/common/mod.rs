//! Shared test fixtures

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clipkun_cli::adapters::LocalFsAdapter;
use clipkun_cli::app::session::SessionOptions;
use clipkun_cli::ports::{EnginePort, ProgressCallback};
use clipkun_cli::{DomainError, Progress, TrimInteractor, TrimSession};
use tempfile::TempDir;
use tokio::sync::Notify;

/// Engine fake that records every call and "trims" by prefixing the input
/// bytes with `trimmed:`.
#[derive(Default)]
pub struct RecordingEngine {
    files: Mutex<HashMap<String, Vec<u8>>>,
    runs: Mutex<Vec<Vec<String>>>,
    loads: AtomicUsize,
    progress: Mutex<Option<Arc<dyn ProgressCallback>>>,
    ratios: Vec<f64>,
    fail_with: Option<String>,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report these ratios while running
    pub fn with_ratios(mut self, ratios: &[f64]) -> Self {
        self.ratios = ratios.to_vec();
        self
    }

    /// Exit unsuccessfully from `run`
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    /// Signal `entered` when `run` starts, then wait for `release`
    pub fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((entered, release));
        self
    }

    pub fn runs(&self) -> Vec<Vec<String>> {
        self.runs.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl EnginePort for RecordingEngine {
    async fn load(&self) -> Result<(), DomainError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_progress(&self, callback: Arc<dyn ProgressCallback>) {
        *self.progress.lock().unwrap() = Some(callback);
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), DomainError> {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        self.files
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::FsFail(format!("no such engine file: {}", name)))
    }

    async fn remove_file(&self, name: &str) -> Result<(), DomainError> {
        self.files.lock().unwrap().remove(name);
        Ok(())
    }

    async fn run(&self, args: &[String]) -> Result<(), DomainError> {
        self.runs.lock().unwrap().push(args.to_vec());

        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }

        let callback = self.progress.lock().unwrap().clone();
        if let Some(callback) = &callback {
            for ratio in &self.ratios {
                callback.on_progress(Progress::new(*ratio));
            }
        }

        if let Some(message) = &self.fail_with {
            return Err(DomainError::EngineFailed(message.clone()));
        }

        let input = args[3].clone();
        let output = args[args.len() - 1].clone();
        let mut data = b"trimmed:".to_vec();
        data.extend(self.read_file(&input).await?);
        self.write_file(&output, &data).await?;

        if let Some(callback) = &callback {
            callback.on_progress(Progress::new(1.0));
        }
        Ok(())
    }
}

/// Temp directory holding a fake video
pub struct Fixture {
    pub dir: TempDir,
    pub video: PathBuf,
}

impl Fixture {
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join(name);
        std::fs::write(&video, b"fake video data").unwrap();
        Self { dir, video }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn session_with(engine: Arc<RecordingEngine>, output_dir: Option<&Path>) -> TrimSession {
    let interactor = Arc::new(TrimInteractor::new(
        engine,
        Arc::new(LocalFsAdapter::new()),
        "output.mp4".to_string(),
    ));
    TrimSession::new(
        interactor,
        SessionOptions {
            output_dir: output_dir.map(Path::to_path_buf),
            overwrite: false,
        },
    )
}
