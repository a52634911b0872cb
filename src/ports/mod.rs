// Ports - Interface definitions (contracts)

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::domain::errors::*;
use crate::domain::model::*;

/// Receives engine progress ratios in [0, 1]
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, progress: Progress);
}

impl<F> ProgressCallback for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn on_progress(&self, progress: Progress) {
        self(progress)
    }
}

/// Port for the external media engine.
///
/// The engine owns a private working filesystem: input bytes are written
/// into it by name, the engine is run with an argument vector that refers
/// to those names, and results are read back by name.
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Make the engine ready. Calling it again is a no-op.
    async fn load(&self) -> Result<(), DomainError>;

    /// Replace the progress listener
    fn set_progress(&self, callback: Arc<dyn ProgressCallback>);

    /// Write a file into the engine's working filesystem
    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), DomainError>;

    /// Read a file back from the engine's working filesystem
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError>;

    /// Remove a file from the engine's working filesystem
    async fn remove_file(&self, name: &str) -> Result<(), DomainError>;

    /// Run the engine with the given arguments
    async fn run(&self, args: &[String]) -> Result<(), DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Check if file exists
    async fn file_exists(&self, path: &Path) -> Result<bool, DomainError>;

    /// Get file size
    async fn file_size(&self, path: &Path) -> Result<u64, DomainError>;

    /// Read a whole file
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, DomainError>;

    /// Write a whole file, creating parent directories
    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), DomainError>;
}

/// Port for configuration management
pub trait ConfigPort: Send + Sync {
    /// Resolve the effective configuration
    fn load(&self) -> Result<AppConfig, DomainError>;
}
