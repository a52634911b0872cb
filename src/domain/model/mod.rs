// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::errors::DomainError;

/// MIME type written on every trimmed clip
pub const OUTPUT_MIME_TYPE: &str = "video/mp4";

/// Time specification - a playback position in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Create a new TimeSpec from hours, minutes, seconds, milliseconds
    pub fn from_components(hours: u32, minutes: u32, seconds: u32, milliseconds: u32) -> Self {
        let total_seconds = hours as f64 * 3600.0
            + minutes as f64 * 60.0
            + seconds as f64
            + milliseconds as f64 / 1000.0;
        Self { seconds: total_seconds }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Convert to Duration
    pub fn to_duration(&self) -> Duration {
        Duration::from_secs_f64(self.seconds.max(0.0))
    }

    /// Parse time string: seconds (`12.5`), `MM:SS.ms` or `HH:MM:SS.ms`
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() {
                return Err(DomainError::BadArgs("Time must be a finite number".to_string()));
            }
            if seconds < 0.0 {
                return Err(DomainError::BadArgs("Time cannot be negative".to_string()));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        match parts.as_slice() {
            [minutes, seconds] => {
                let minutes = parse_unit(minutes, "minutes")?;
                let seconds = parse_seconds_part(seconds)?;
                Ok(Self::from_seconds(minutes as f64 * 60.0 + seconds))
            }
            [hours, minutes, seconds] => {
                let hours = parse_unit(hours, "hours")?;
                let minutes = parse_unit(minutes, "minutes")?;
                if minutes >= 60 {
                    return Err(DomainError::BadArgs("Minutes must be less than 60".to_string()));
                }
                let seconds = parse_seconds_part(seconds)?;
                Ok(Self::from_seconds(
                    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
                ))
            }
            _ => Err(DomainError::BadArgs(format!(
                "Invalid time '{}'. Supported formats: seconds (e.g., 123.45), MM:SS.ms (e.g., 2:30.5), HH:MM:SS.ms (e.g., 1:02:30.5)",
                trimmed
            ))),
        }
    }

    /// Format as `M:SS.mmm`, or `H:MM:SS.mmm` past the hour
    pub fn format_hms(&self) -> String {
        let total_ms = (self.seconds * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }
}

fn parse_unit(part: &str, unit: &str) -> Result<u32, DomainError> {
    part.parse::<u32>()
        .map_err(|_| DomainError::BadArgs(format!("Invalid {} format", unit)))
}

fn parse_seconds_part(part: &str) -> Result<f64, DomainError> {
    let seconds = part
        .parse::<f64>()
        .map_err(|_| DomainError::BadArgs("Invalid seconds format".to_string()))?;
    if !(0.0..60.0).contains(&seconds) {
        return Err(DomainError::BadArgs("Seconds must be less than 60".to_string()));
    }
    Ok(seconds)
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// The retained slice of the source, as second offsets.
///
/// Construction never rejects a range: an equal or inverted pair is a
/// legitimate intermediate state while the user is still marking points.
/// Validation happens on submit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TrimRange {
    pub from: f64,
    pub to: f64,
}

impl TrimRange {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn from_specs(from: TimeSpec, to: TimeSpec) -> Self {
        Self::new(from.seconds, to.seconds)
    }

    /// Length of the retained slice; negative for an inverted range
    pub fn duration(&self) -> f64 {
        self.to - self.from
    }

    pub fn with_from(self, from: f64) -> Self {
        Self { from, ..self }
    }

    pub fn with_to(self, to: f64) -> Self {
        Self { to, ..self }
    }
}

/// Handle on the video the user picked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedFile {
    pub path: PathBuf,
    /// Bare file name, used as the name inside the engine's working directory
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Result<Self, DomainError> {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DomainError::BadArgs(format!("Not a file path: {}", path.display())))?;
        let mime_type = guess_mime_type(&path).to_string();

        Ok(Self {
            path,
            name,
            mime_type,
            size,
        })
    }

    /// File name without extension
    pub fn stem(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// Guess a video MIME type from the file extension
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "ts" | "mts" | "m2ts" => "video/mp2t",
        "ogv" => "video/ogg",
        _ => "application/octet-stream",
    }
}

/// Bytes plus a MIME type, read back from the engine
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBlob {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl MediaBlob {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Engine progress as a ratio in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Progress {
    ratio: f64,
}

impl Progress {
    /// Out-of-range and NaN ratios are clamped
    pub fn new(ratio: f64) -> Self {
        let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        Self { ratio }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn is_complete(&self) -> bool {
        self.ratio >= 1.0
    }
}

/// What a media handle points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Source,
    Result,
}

/// Opaque handle for a registered source or result
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MediaUrl(String);

impl MediaUrl {
    pub(crate) fn from_id(id: u64) -> Self {
        Self(format!("media:{}", id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result record of a completed trim
#[derive(Debug, Clone, Serialize)]
pub struct TrimOutcome {
    pub input: PathBuf,
    pub output_path: PathBuf,
    pub mime_type: String,
    pub size: u64,
    pub range: TrimRange,
    pub args: Vec<String>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
    pub created_at: DateTime<Utc>,
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}
