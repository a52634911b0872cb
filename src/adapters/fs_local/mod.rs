// Local filesystem adapter

use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use crate::domain::errors::*;
use crate::ports::*;

/// Filesystem adapter backed by tokio::fs
#[derive(Debug, Default, Clone)]
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FsPort for LocalFsAdapter {
    async fn file_exists(&self, path: &Path) -> Result<bool, DomainError> {
        match fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::FsFail(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn file_size(&self, path: &Path) -> Result<u64, DomainError> {
        let metadata = fs::metadata(path).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to get file size of {}: {}", path.display(), e))
        })?;
        Ok(metadata.len())
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, DomainError> {
        fs::read(path)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to read {}: {}", path.display(), e)))
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), DomainError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::FsFail(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        fs::write(path, data)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to write {}: {}", path.display(), e)))
    }
}
