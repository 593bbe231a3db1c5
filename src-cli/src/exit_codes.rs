//! Exit codes for the CLI.
//!
//! These codes enable scripting integration by providing structured
//! feedback about operation results.

use picam::CameraError;

/// Exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,
    /// General/unspecified error
    GeneralError = 1,
    /// Invalid command-line arguments
    InvalidArguments = 2,
    /// The camera is busy or not connected
    CameraBusy = 3,
    /// The capture tool failed
    CaptureFailed = 4,
    /// The capture was cancelled by a signal
    Cancelled = 5,
    /// A capture tool is not installed
    ToolNotFound = 6,
    /// Task id or reservation misuse
    TaskError = 7,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&CameraError> for ExitCode {
    fn from(err: &CameraError) -> Self {
        match err {
            CameraError::DeviceBusy => ExitCode::CameraBusy,
            CameraError::CaptureToolFailure { .. } => ExitCode::CaptureFailed,
            CameraError::Cancelled(_) => ExitCode::Cancelled,
            CameraError::Spawn { .. } => ExitCode::ToolNotFound,
            CameraError::NotReserved
            | CameraError::UnknownTaskId(_)
            | CameraError::DuplicateTaskId(_) => ExitCode::TaskError,
            CameraError::Config(_) => ExitCode::InvalidArguments,
            CameraError::CancelAllPartialFailure(_) | CameraError::SignalFailed { .. } => {
                ExitCode::GeneralError
            }
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitCode::Success => write!(f, "success"),
            ExitCode::GeneralError => write!(f, "general error"),
            ExitCode::InvalidArguments => write!(f, "invalid arguments"),
            ExitCode::CameraBusy => write!(f, "camera busy"),
            ExitCode::CaptureFailed => write!(f, "capture failed"),
            ExitCode::Cancelled => write!(f, "cancelled"),
            ExitCode::ToolNotFound => write!(f, "capture tool not found"),
            ExitCode::TaskError => write!(f, "task error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(ExitCode::from(&CameraError::DeviceBusy), ExitCode::CameraBusy);
        assert_eq!(
            ExitCode::from(&CameraError::Cancelled("a".into())),
            ExitCode::Cancelled
        );
        assert_eq!(ExitCode::from(&CameraError::NotReserved).as_i32(), 7);
    }
}
