//! Handle registry for source and result media.
//!
//! A handle stands in for the media it points at until it is revoked.
//! Ids are never reused, so a revoked handle stays dead even after new
//! media is registered.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaKind, MediaUrl};

/// What a live handle resolves to
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEntry {
    pub kind: MediaKind,
    pub path: PathBuf,
    pub mime_type: String,
}

#[derive(Debug, Default)]
pub struct MediaRegistry {
    next_id: u64,
    entries: BTreeMap<MediaUrl, MediaEntry>,
}

impl MediaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, kind: MediaKind, path: &Path, mime_type: &str) -> MediaUrl {
        self.next_id += 1;
        let url = MediaUrl::from_id(self.next_id);
        debug!("Registered {:?} media {} -> {}", kind, url, path.display());
        self.entries.insert(
            url.clone(),
            MediaEntry {
                kind,
                path: path.to_path_buf(),
                mime_type: mime_type.to_string(),
            },
        );
        url
    }

    pub fn resolve(&self, url: &MediaUrl) -> Option<&MediaEntry> {
        self.entries.get(url)
    }

    pub fn revoke(&mut self, url: &MediaUrl) -> Result<MediaEntry, DomainError> {
        let entry = self
            .entries
            .remove(url)
            .ok_or_else(|| DomainError::UnknownHandle(url.to_string()))?;
        debug!("Revoked media {}", url);
        Ok(entry)
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
