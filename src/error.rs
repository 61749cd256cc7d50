//! Error handling for LoopXFade
//!
//! Validation errors carry the offending values so the diagnostic can be
//! printed as-is. Collaborator failures (source, destination) are kept apart
//! from validation failures but are just as fatal for the run.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for LoopXFade operations
pub type Result<T> = std::result::Result<T, LoopXfadeError>;

/// Main error type for LoopXFade operations
#[derive(Error, Debug)]
pub enum LoopXfadeError {
    // Loop parameter errors
    #[error("The specified loop end {loop_end} is past the file's endpoint of {source_length}")]
    LoopEndBeyondSource { loop_end: usize, source_length: usize },

    #[error("The specified loop start {loop_start} is past the loop end {loop_end}")]
    LoopStartAfterEnd { loop_start: usize, loop_end: usize },

    #[error(
        "The specified loop start {loop_start} minus the loop crossfade {crossfade} is negative. \
         Given where the loop start point is, the largest possible crossfade is {max_crossfade}"
    )]
    CrossfadeExceedsLookback {
        loop_start: usize,
        crossfade: usize,
        max_crossfade: usize,
    },

    #[error("The specified loop crossfade {crossfade} is longer than the loop region {loop_body}")]
    CrossfadeExceedsLoopBody { crossfade: usize, loop_body: usize },

    // Source errors
    #[error("Failed to open input file {path}: {reason}")]
    SourceUnreadable {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<hound::Error>,
    },

    #[error("Unsupported audio format: {details}")]
    UnsupportedFormat { details: String },

    // Output errors
    #[error("Failed to create output file {path}: {reason}")]
    OutputUnwritable {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Output file exists already: {path}")]
    OutputAlreadyExists { path: PathBuf },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LoopXfadeError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            LoopXfadeError::LoopEndBeyondSource { .. } => "LOOP_END_BEYOND_SOURCE",
            LoopXfadeError::LoopStartAfterEnd { .. } => "LOOP_START_AFTER_END",
            LoopXfadeError::CrossfadeExceedsLookback { .. } => "CROSSFADE_EXCEEDS_LOOKBACK",
            LoopXfadeError::CrossfadeExceedsLoopBody { .. } => "CROSSFADE_EXCEEDS_LOOP_BODY",
            LoopXfadeError::SourceUnreadable { .. } => "SOURCE_UNREADABLE",
            LoopXfadeError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            LoopXfadeError::OutputUnwritable { .. } => "OUTPUT_UNWRITABLE",
            LoopXfadeError::OutputAlreadyExists { .. } => "OUTPUT_ALREADY_EXISTS",
            LoopXfadeError::Io(_) => "IO_ERROR",
            LoopXfadeError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True for errors raised by the loop parameter checks
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            LoopXfadeError::LoopEndBeyondSource { .. }
                | LoopXfadeError::LoopStartAfterEnd { .. }
                | LoopXfadeError::CrossfadeExceedsLookback { .. }
                | LoopXfadeError::CrossfadeExceedsLoopBody { .. }
        )
    }

    /// Returns a suggested recovery action for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::LoopEndBeyondSource { .. } => "Pick a loop end inside the source file",
            Self::LoopStartAfterEnd { .. } => "Swap the loop points so that start <= end",
            Self::CrossfadeExceedsLookback { .. } => {
                "Move the loop start later or shorten the crossfade"
            }
            Self::CrossfadeExceedsLoopBody { .. } => {
                "Shorten the crossfade or widen the loop region"
            }
            Self::SourceUnreadable { .. } => "Check that the file exists and is a valid WAV file",
            Self::UnsupportedFormat { .. } => "Convert to 8/16/24/32-bit PCM or 32-bit float WAV",
            Self::OutputUnwritable { .. } => "Check that the destination directory is writable",
            Self::OutputAlreadyExists { .. } => "Remove the existing file or choose another path",
            _ => "Check the error details and try again",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = LoopXfadeError::LoopStartAfterEnd {
            loop_start: 10,
            loop_end: 5,
        };
        assert_eq!(err.error_code(), "LOOP_START_AFTER_END");
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_lookback_message_names_max_crossfade() {
        let err = LoopXfadeError::CrossfadeExceedsLookback {
            loop_start: 20,
            crossfade: 30,
            max_crossfade: 20,
        };
        let msg = err.to_string();
        assert!(msg.contains("loop start 20"));
        assert!(msg.contains("crossfade 30"));
        assert!(msg.contains("largest possible crossfade is 20"));
    }

    #[test]
    fn test_collaborator_errors_are_not_validation_errors() {
        let err = LoopXfadeError::OutputAlreadyExists {
            path: PathBuf::from("out.wav"),
        };
        assert!(!err.is_validation_error());
        assert!(!err.recovery_hint().is_empty());
    }
}
