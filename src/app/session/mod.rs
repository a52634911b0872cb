//! Interactive trim session
//!
//! Holds the state a user builds up between opening a video and getting
//! a clip back: the selected file, the playback position, the trim range,
//! the in-progress flag, engine progress and the last result. Methods take
//! `&self` so a session can be shared; the state lock is never held across
//! an await, which is what lets a second submit observe `is_trimming`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::media_registry::{MediaEntry, MediaRegistry};
use crate::app::progress::ProgressTracker;
use crate::app::trim_interactor::{TrimInteractor, TrimRequest};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::ProgressCallback;

/// Session-level output settings
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub output_dir: Option<PathBuf>,
    pub overwrite: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    selected: Option<SelectedFile>,
    preview_url: Option<MediaUrl>,
    position: f64,
    range: TrimRange,
    is_trimming: bool,
    result: Option<(MediaUrl, TrimOutcome)>,
    registry: MediaRegistry,
}

/// Result of a finished trim as shown to the user
#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub url: MediaUrl,
    pub output_path: PathBuf,
    pub size: u64,
    pub mime_type: String,
}

/// Point-in-time view of the session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub file: Option<String>,
    pub preview_url: Option<MediaUrl>,
    pub position: f64,
    pub range: TrimRange,
    pub summary: String,
    pub is_trimming: bool,
    pub percent: Option<u32>,
    pub status_line: Option<String>,
    pub result: Option<ResultView>,
}

pub struct TrimSession {
    interactor: Arc<TrimInteractor>,
    options: SessionOptions,
    progress: ProgressTracker,
    state: Mutex<SessionState>,
}

/// Clears `is_trimming` however the submit future ends
struct TrimmingGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for TrimmingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.is_trimming = false;
        }
    }
}

impl TrimSession {
    pub fn new(interactor: Arc<TrimInteractor>, options: SessionOptions) -> Self {
        Self {
            interactor,
            options,
            progress: ProgressTracker::new(),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Extra listener for engine progress (e.g. a console bar)
    pub fn add_progress_listener(&self, listener: Arc<dyn ProgressCallback>) {
        self.progress.add_listener(listener);
    }

    pub fn remove_progress_listener(&self, listener: &Arc<dyn ProgressCallback>) {
        self.progress.remove_listener(listener);
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::BadArgs("session state poisoned".to_string()))
    }

    /// Open a video. Replaces any previous selection and starts over with
    /// an empty range.
    pub async fn select_file(&self, path: impl AsRef<Path>) -> Result<MediaUrl, DomainError> {
        let path = path.as_ref();
        let fs = self.interactor.fs();
        if !fs.file_exists(path).await? {
            return Err(DomainError::LoadFailed(path.display().to_string()));
        }
        let size = fs.file_size(path).await?;
        let file = SelectedFile::new(path, size)
            .map_err(|e| DomainError::LoadFailed(e.to_string()))?;

        let mut state = self.lock()?;
        if let Some(old) = state.preview_url.take() {
            state.registry.revoke(&old)?;
        }
        let url = state
            .registry
            .create(MediaKind::Source, &file.path, &file.mime_type);
        info!("Opened {} ({}, {} bytes) as {}", file.name, file.mime_type, file.size, url);
        state.selected = Some(file);
        state.preview_url = Some(url.clone());
        state.position = 0.0;
        state.range = TrimRange::default();
        Ok(url)
    }

    /// Move the playback position
    pub fn seek(&self, position: TimeSpec) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        if state.selected.is_none() {
            return Err(DomainError::NoFileSelected);
        }
        if position.seconds < 0.0 || !position.seconds.is_finite() {
            return Err(DomainError::BadArgs("Position cannot be negative".to_string()));
        }
        state.position = position.seconds;
        Ok(())
    }

    /// Current position becomes the in-point
    pub fn mark_from(&self) -> Result<TrimRange, DomainError> {
        let mut state = self.lock()?;
        let position = state.current_time();
        state.range = state.range.with_from(position);
        debug!("In-point set to {}", position);
        Ok(state.range)
    }

    /// Current position becomes the out-point
    pub fn mark_to(&self) -> Result<TrimRange, DomainError> {
        let mut state = self.lock()?;
        let position = state.current_time();
        state.range = state.range.with_to(position);
        debug!("Out-point set to {}", position);
        Ok(state.range)
    }

    pub fn set_from(&self, time: TimeSpec) -> Result<TrimRange, DomainError> {
        self.seek(time)?;
        self.mark_from()
    }

    pub fn set_to(&self, time: TimeSpec) -> Result<TrimRange, DomainError> {
        self.seek(time)?;
        self.mark_to()
    }

    /// Validated request and engine arguments for the current state,
    /// without running anything
    pub fn plan(
        &self,
        output: Option<PathBuf>,
    ) -> Result<(TrimRequest, Vec<String>), DomainError> {
        let state = self.lock()?;
        let request = self.build_request(&state, output)?;
        let args = self.interactor.plan(&request)?;
        Ok((request, args))
    }

    /// Trim the selected file to the current range
    pub async fn submit(&self) -> Result<ResultView, DomainError> {
        self.submit_to(None).await
    }

    /// Trim, writing to `output` instead of the derived name when given
    pub async fn submit_to(&self, output: Option<PathBuf>) -> Result<ResultView, DomainError> {
        let request = {
            let mut state = self.lock()?;
            if state.is_trimming {
                return Err(DomainError::Busy);
            }
            let request = self.build_request(&state, output)?;
            state.is_trimming = true;
            request
        };
        let _guard = TrimmingGuard { state: &self.state };

        self.progress.reset();
        let callback: Arc<dyn ProgressCallback> = Arc::new(self.progress.clone());
        let outcome = self.interactor.execute(request, callback).await?;

        let mut state = self.lock()?;
        if let Some((old, _)) = state.result.take() {
            state.registry.revoke(&old)?;
        }
        let url = state
            .registry
            .create(MediaKind::Result, &outcome.output_path, &outcome.mime_type);
        let view = ResultView {
            url: url.clone(),
            output_path: outcome.output_path.clone(),
            size: outcome.size,
            mime_type: outcome.mime_type.clone(),
        };
        state.result = Some((url, outcome));
        Ok(view)
    }

    fn build_request(
        &self,
        state: &SessionState,
        output: Option<PathBuf>,
    ) -> Result<TrimRequest, DomainError> {
        TrimRangeValidator::validate_submission(state.selected.as_ref(), &state.range)?;
        let file = state.selected.clone().ok_or(DomainError::NoFileSelected)?;
        let mut request = TrimRequest::with_default_output(
            file,
            state.range,
            self.options.output_dir.as_deref(),
            self.options.overwrite,
        );
        if let Some(output) = output {
            request.output_path = output;
        }
        Ok(request)
    }

    /// Clear the range and the selected file
    pub fn reset(&self) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        state.range = TrimRange::default();
        state.selected = None;
        state.position = 0.0;
        if let Some(url) = state.preview_url.take() {
            state.registry.revoke(&url)?;
        }
        info!("Session reset");
        Ok(())
    }

    /// Close the result. Returns false when nothing was shown.
    pub fn dismiss_result(&self) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state.result.take() {
            Some((url, _)) => {
                state.registry.revoke(&url)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Last completed trim, if still shown
    pub fn last_outcome(&self) -> Option<TrimOutcome> {
        self.lock()
            .ok()
            .and_then(|state| state.result.as_ref().map(|(_, o)| o.clone()))
    }

    /// Look up a live handle
    pub fn resolve(&self, url: &MediaUrl) -> Option<MediaEntry> {
        self.lock()
            .ok()
            .and_then(|state| state.registry.resolve(url).cloned())
    }

    pub fn live_handles(&self) -> usize {
        self.lock().map(|state| state.registry.len()).unwrap_or(0)
    }

    pub fn status(&self) -> SessionStatus {
        let progress = self.progress.current();
        let state = match self.lock() {
            Ok(state) => state,
            Err(e) => {
                warn!("{}", e);
                return SessionStatus::empty();
            }
        };
        SessionStatus {
            file: state.selected.as_ref().map(|f| f.name.clone()),
            preview_url: state.preview_url.clone(),
            position: state.position,
            range: state.range,
            summary: ProgressDisplay::range_summary(&state.range),
            is_trimming: state.is_trimming,
            percent: ProgressDisplay::shows_percentage(progress)
                .then(|| ProgressDisplay::percent(progress)),
            status_line: ProgressDisplay::status_line(state.is_trimming, progress),
            result: state.result.as_ref().map(|(url, outcome)| ResultView {
                url: url.clone(),
                output_path: outcome.output_path.clone(),
                size: outcome.size,
                mime_type: outcome.mime_type.clone(),
            }),
        }
    }
}

impl SessionState {
    /// Playback position; 0 with nothing loaded
    fn current_time(&self) -> f64 {
        if self.selected.is_some() {
            self.position
        } else {
            0.0
        }
    }
}

impl SessionStatus {
    fn empty() -> Self {
        let range = TrimRange::default();
        Self {
            file: None,
            preview_url: None,
            position: 0.0,
            range,
            summary: ProgressDisplay::range_summary(&range),
            is_trimming: false,
            percent: None,
            status_line: None,
            result: None,
        }
    }
}
