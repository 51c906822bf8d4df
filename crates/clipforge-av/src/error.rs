//! Error types for clipforge-av.

use std::path::PathBuf;

use crate::probe::MediaKind;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while synthesizing or running a media command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The selected input file does not exist.
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// A speed multiplier outside the accepted domain.
    #[error("invalid speed factor {factor}: must be a finite number greater than 0")]
    InvalidFactor { factor: f64 },

    /// A duration-dependent operation was requested on media without a known duration.
    #[error("media duration is unknown; size-targeted encoding needs a duration")]
    DurationUnknown,

    /// The requested file size leaves no room for video after the audio share.
    #[error(
        "target size too small: {total_kbps} kbps total leaves nothing after {audio_kbps} kbps of audio"
    )]
    BudgetTooSmall { total_kbps: i64, audio_kbps: u32 },

    /// The operation does not apply to this kind of media.
    #[error("{operation} is not available for {kind} input")]
    UnsupportedOperation {
        operation: &'static str,
        kind: MediaKind,
    },

    /// A hardware path was requested but no usable encoder was detected.
    #[error("no hardware encoder available for {operation}")]
    MissingCapability { operation: &'static str },

    /// The output path resolves to the input file.
    #[error("output path is the same as the input: {}", path.display())]
    OutputIsInput { path: PathBuf },

    /// The user refused to overwrite an existing output.
    #[error("refused to overwrite existing file: {}", path.display())]
    OverwriteDeclined { path: PathBuf },

    /// An external process exited unsuccessfully.
    #[error("{tool} failed at step {step}: {}", describe_exit(*exit_code))]
    ExternalProcessFailed {
        tool: String,
        step: usize,
        exit_code: Option<i32>,
    },

    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// Failed to parse tool output.
    #[error("failed to parse {tool} output: {message}")]
    ParseError { tool: String, message: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a parse error.
    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create an input not found error.
    pub fn input_not_found(path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    /// Whether this error ends the whole session rather than just the
    /// current operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::OverwriteDeclined { .. })
    }

    /// Exit code reported by the external tool, if this is a process failure.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::ExternalProcessFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failure_display_keeps_exit_code() {
        let err = Error::ExternalProcessFailed {
            tool: "ffmpeg".to_string(),
            step: 1,
            exit_code: Some(183),
        };
        assert_eq!(err.to_string(), "ffmpeg failed at step 1: exit code 183");
        assert_eq!(err.exit_code(), Some(183));
    }

    #[test]
    fn test_signal_termination_display() {
        let err = Error::ExternalProcessFailed {
            tool: "ffmpeg".to_string(),
            step: 2,
            exit_code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_only_overwrite_declined_is_fatal() {
        assert!(Error::OverwriteDeclined {
            path: PathBuf::from("out.mp4")
        }
        .is_fatal());
        assert!(!Error::DurationUnknown.is_fatal());
        assert!(!Error::InvalidFactor { factor: 0.0 }.is_fatal());
        assert!(!Error::ExternalProcessFailed {
            tool: "ffmpeg".into(),
            step: 1,
            exit_code: Some(1)
        }
        .is_fatal());
    }

    #[test]
    fn test_unsupported_operation_display() {
        let err = Error::UnsupportedOperation {
            operation: "extract audio",
            kind: MediaKind::Audio,
        };
        assert_eq!(err.to_string(), "extract audio is not available for audio input");
    }
}
