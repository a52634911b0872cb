// Domain rules - Business logic and policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Name the engine writes the trimmed clip under
pub const DEFAULT_OUTPUT_NAME: &str = "output.mp4";

/// Business rules for accepting a trim submission
pub struct TrimRangeValidator;

impl TrimRangeValidator {
    /// Check a submission. Order matters: missing file, then equal
    /// bounds, then inverted bounds.
    pub fn validate_submission(
        file: Option<&SelectedFile>,
        range: &TrimRange,
    ) -> Result<(), DomainError> {
        if file.is_none() {
            return Err(DomainError::NoFileSelected);
        }
        Self::validate_range(range)
    }

    pub fn validate_range(range: &TrimRange) -> Result<(), DomainError> {
        if !range.from.is_finite() || !range.to.is_finite() {
            return Err(DomainError::BadArgs("Trim bounds must be finite".to_string()));
        }
        if range.from == range.to {
            return Err(DomainError::EmptyRange);
        }
        if range.from > range.to {
            return Err(DomainError::InvertedRange);
        }
        Ok(())
    }
}

/// Builds the argument vector handed to the engine
pub struct EngineArgs;

impl EngineArgs {
    /// `-ss <from> -i <input> -ss 0 -t <to-from> -c copy <output>`
    ///
    /// The first `-ss` is an input seek, the second resets the output
    /// offset so `-t` counts from the in-point.
    pub fn build_trim_args(range: &TrimRange, input_name: &str, output_name: &str) -> Vec<String> {
        vec![
            "-ss".to_string(),
            format_engine_number(range.from),
            "-i".to_string(),
            input_name.to_string(),
            "-ss".to_string(),
            "0".to_string(),
            "-t".to_string(),
            format_engine_number(range.duration()),
            "-c".to_string(),
            "copy".to_string(),
            output_name.to_string(),
        ]
    }

    /// Clip length carried by the `-t` argument
    pub fn clip_length(args: &[String]) -> Option<f64> {
        args.iter()
            .position(|a| a == "-t")
            .and_then(|i| args.get(i + 1))
            .and_then(|v| v.parse::<f64>().ok())
    }
}

/// Shortest decimal that round-trips (`10`, `1.5`, `0.1`)
pub fn format_engine_number(value: f64) -> String {
    if value == 0.0 {
        // folds -0 into 0
        return "0".to_string();
    }
    format!("{}", value)
}

/// Display rules for progress and the range summary line
pub struct ProgressDisplay;

impl ProgressDisplay {
    /// Whole-number percentage, rounded up
    pub fn percent(progress: Progress) -> u32 {
        (progress.ratio() * 100.0).ceil() as u32
    }

    /// A percentage is shown only strictly between start and finish
    pub fn shows_percentage(progress: Progress) -> bool {
        progress.ratio() > 0.0 && progress.ratio() < 1.0
    }

    /// Status text while a trim is running, `None` when idle
    pub fn status_line(is_trimming: bool, progress: Progress) -> Option<String> {
        if Self::shows_percentage(progress) {
            Some(format!("Converting: {}%", Self::percent(progress)))
        } else if is_trimming {
            Some("Converting...".to_string())
        } else {
            None
        }
    }

    /// `From: M:S, To: M:S (Duration: Ns)`. Half seconds round up, also
    /// for inverted ranges.
    pub fn range_summary(range: &TrimRange) -> String {
        format!(
            "From: {}:{}, To: {}:{} (Duration: {}s)",
            format_engine_number((range.from / 60.0).floor()),
            format_engine_number((range.from % 60.0).floor()),
            format_engine_number((range.to / 60.0).floor()),
            format_engine_number((range.to % 60.0).floor()),
            format_engine_number((range.duration() + 0.5).floor())
        )
    }
}
