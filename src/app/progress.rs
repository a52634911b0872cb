//! Progress tracking and console rendering

use std::sync::{Arc, Mutex};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::domain::model::Progress;
use crate::domain::rules::ProgressDisplay;
use crate::ports::ProgressCallback;

/// Remembers the latest ratio and fans it out to listeners
#[derive(Clone, Default)]
pub struct ProgressTracker {
    latest: Arc<Mutex<Progress>>,
    listeners: Arc<Mutex<Vec<Arc<dyn ProgressCallback>>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn ProgressCallback>) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(listener);
        }
    }

    /// Drop a listener previously passed to `add_listener`
    pub fn remove_listener(&self, listener: &Arc<dyn ProgressCallback>) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|l| !Arc::ptr_eq(l, listener));
        }
    }

    pub fn current(&self) -> Progress {
        self.latest.lock().map(|p| *p).unwrap_or_default()
    }

    pub fn reset(&self) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Progress::default();
        }
    }
}

impl ProgressCallback for ProgressTracker {
    fn on_progress(&self, progress: Progress) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = progress;
        }
        let listeners = self
            .listeners
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default();
        for listener in listeners {
            listener.on_progress(progress);
        }
    }
}

/// Percentage bar on stderr
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr());
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos:>3}% {msg}")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar.set_message(label.to_string());
        Self { bar }
    }

    /// Bar that draws nothing, for `--json` and non-interactive use
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_progress(&self, progress: Progress) {
        self.bar
            .set_position(ProgressDisplay::percent(progress) as u64);
    }
}
