//! clipkun library
//!
//! Trim-session state, validation and engine argument construction for a
//! video trimmer that delegates the actual cut to an external engine.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use app::{TrimInteractor, TrimRequest, TrimSession};
pub use config::AppConfig;
pub use domain::errors::DomainError;
pub use domain::model::{MediaBlob, MediaUrl, Progress, SelectedFile, TimeSpec, TrimOutcome, TrimRange};
pub use domain::rules::{EngineArgs, ProgressDisplay, TrimRangeValidator};
