//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the rustbin application.
///
/// - 0: Success (every requested path was processed)
/// - 1: General error (setup failed, nothing was processed)
/// - 3: Partial failure (one or more paths failed while processing continued)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: all requested operations completed.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// Partial failure: at least one path failed; the rest were still processed.
    PartialFailure = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "RB000",
            Self::GeneralError => "RB001",
            Self::PartialFailure => "RB003",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "RB001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
