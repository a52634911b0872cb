// Trim interactor - Orchestrates the trim use case

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Request for a single trim
#[derive(Debug, Clone)]
pub struct TrimRequest {
    pub file: SelectedFile,
    pub range: TrimRange,
    pub output_path: PathBuf,
    pub overwrite: bool,
}

impl TrimRequest {
    /// Request writing next to the input (or into `output_dir`) under a
    /// name derived from the range
    pub fn with_default_output(
        file: SelectedFile,
        range: TrimRange,
        output_dir: Option<&Path>,
        overwrite: bool,
    ) -> Self {
        let output_path = default_output_path(&file, &range, output_dir);
        Self {
            file,
            range,
            output_path,
            overwrite,
        }
    }
}

/// Interactor for the trim use case
pub struct TrimInteractor {
    engine: Arc<dyn EnginePort>,
    fs: Arc<dyn FsPort>,
    output_name: String,
}

impl TrimInteractor {
    /// Create new trim interactor with injected ports
    pub fn new(engine: Arc<dyn EnginePort>, fs: Arc<dyn FsPort>, output_name: String) -> Self {
        Self {
            engine,
            fs,
            output_name,
        }
    }

    pub fn fs(&self) -> Arc<dyn FsPort> {
        Arc::clone(&self.fs)
    }

    /// Validate and return the argument vector without touching the engine
    pub fn plan(&self, request: &TrimRequest) -> Result<Vec<String>, DomainError> {
        TrimRangeValidator::validate_submission(Some(&request.file), &request.range)?;
        let input_name = self.engine_input_name(&request.file);
        Ok(EngineArgs::build_trim_args(
            &request.range,
            &input_name,
            &self.output_name,
        ))
    }

    /// Run one trim through the engine and write the clip to disk
    pub async fn execute(
        &self,
        request: TrimRequest,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<TrimOutcome, DomainError> {
        let args = self.plan(&request)?;
        self.check_output_path(&request).await?;

        info!(
            "Trimming {} [{} - {}]",
            request.file.path.display(),
            TimeSpec::from_seconds(request.range.from),
            TimeSpec::from_seconds(request.range.to)
        );
        let started = Instant::now();

        self.engine.load().await?;
        self.engine.set_progress(progress);

        let input_name = self.engine_input_name(&request.file);
        let source = self
            .fs
            .read_file(&request.file.path)
            .await
            .map_err(|e| DomainError::LoadFailed(e.to_string()))?;
        self.engine.write_file(&input_name, &source).await?;
        drop(source);

        let run_result = self.engine.run(&args).await;
        let blob = match run_result {
            Ok(()) => self
                .engine
                .read_file(&self.output_name)
                .await
                .map(|data| MediaBlob::new(data, OUTPUT_MIME_TYPE)),
            Err(e) => Err(e),
        };
        self.cleanup(&input_name).await;
        let blob = blob?;

        if blob.is_empty() {
            return Err(DomainError::EngineFailed(
                "engine produced an empty output".to_string(),
            ));
        }

        self.fs.write_file(&request.output_path, &blob.data).await?;
        let elapsed = started.elapsed();
        info!(
            "Trim complete: {} ({} bytes in {:.2}s)",
            request.output_path.display(),
            blob.len(),
            elapsed.as_secs_f64()
        );

        Ok(TrimOutcome {
            input: request.file.path,
            output_path: request.output_path,
            mime_type: blob.mime_type,
            size: blob.data.len() as u64,
            range: request.range,
            args,
            elapsed,
            created_at: Utc::now(),
        })
    }

    async fn check_output_path(&self, request: &TrimRequest) -> Result<(), DomainError> {
        if request.output_path == request.file.path {
            return Err(DomainError::BadArgs(
                "Output path must differ from the input path".to_string(),
            ));
        }
        if !request.overwrite && self.fs.file_exists(&request.output_path).await? {
            return Err(DomainError::FsFail(format!(
                "Output file already exists: {} (use --overwrite)",
                request.output_path.display()
            )));
        }
        Ok(())
    }

    /// Working-directory name for the input. An input that shares the
    /// output's name is renamed so the engine never reads and writes the
    /// same file.
    fn engine_input_name(&self, file: &SelectedFile) -> String {
        if file.name == self.output_name {
            format!("input_{}", file.name)
        } else {
            file.name.clone()
        }
    }

    async fn cleanup(&self, input_name: &str) {
        for name in [input_name, self.output_name.as_str()] {
            if let Err(e) = self.engine.remove_file(name).await {
                warn!("Failed to clean engine file {}: {}", name, e);
            }
        }
        debug!("Engine working files cleaned");
    }
}

/// `<dir>/<stem>_trim_<from>-<to>.mp4`
pub fn default_output_path(
    file: &SelectedFile,
    range: &TrimRange,
    output_dir: Option<&Path>,
) -> PathBuf {
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| file.path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!(
        "{}_trim_{}-{}.mp4",
        file.stem(),
        time_token(range.from),
        time_token(range.to)
    ))
}

/// `1m05s`, or `1h02m05s` past the hour
fn time_token(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}h{:02}m{:02}s", hours, minutes, secs)
    } else {
        format!("{}m{:02}s", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_next_to_input() {
        let file = SelectedFile::new("/videos/holiday.mov", 1).unwrap();
        let path = default_output_path(&file, &TrimRange::new(12.5, 65.0), None);
        assert_eq!(path, PathBuf::from("/videos/holiday_trim_0m12s-1m05s.mp4"));
    }

    #[test]
    fn test_default_output_path_in_output_dir() {
        let file = SelectedFile::new("/videos/holiday.mov", 1).unwrap();
        let path = default_output_path(
            &file,
            &TrimRange::new(3600.0, 3725.0),
            Some(Path::new("/clips")),
        );
        assert_eq!(path, PathBuf::from("/clips/holiday_trim_1h00m00s-1h02m05s.mp4"));
    }
}
