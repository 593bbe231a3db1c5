//! Error types for camera operations.

use picam_common::ErrorInfo;
use std::fmt;

/// Error type for camera operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The readiness probe failed, so the device is in use or missing
    DeviceBusy,
    /// Unlock requested while no reservation is held
    NotReserved,
    /// No live task has this id
    UnknownTaskId(String),
    /// A live task already uses this id
    DuplicateTaskId(String),
    /// The capture tool exited with a nonzero status
    CaptureToolFailure {
        tool: String,
        code: i32,
        stderr: String,
    },
    /// The tool was terminated by a signal
    Cancelled(String),
    /// At least one signal failed during cancel-all
    CancelAllPartialFailure(String),
    /// Delivering a signal to a tracked process failed
    SignalFailed { id: String, message: String },
    /// The tool process could not be started
    Spawn { tool: String, message: String },
    /// Configuration could not be read or written
    Config(String),
}

impl CameraError {
    /// Stable machine-readable code.
    pub fn kind(&self) -> &'static str {
        match self {
            CameraError::DeviceBusy => "CAMERA_BUSY_ALREADY",
            CameraError::NotReserved => "NOT_RESERVED",
            CameraError::UnknownTaskId(_) => "BAD_ID",
            CameraError::DuplicateTaskId(_) => "DUPLICATE_ID",
            CameraError::CaptureToolFailure { .. } => "CAMERA_CAPTURE_INTERNAL_ERROR",
            CameraError::Cancelled(_) => "TASK_CANCELLED",
            CameraError::CancelAllPartialFailure(_) => "KILLING_ALL_ID_ERROR",
            CameraError::SignalFailed { .. } => "SIGNAL_FAILED",
            CameraError::Spawn { .. } => "SPAWN_FAILED",
            CameraError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Whether the caller can reasonably branch on this error and continue.
    ///
    /// Duplicate ids are programming errors and never recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CameraError::DeviceBusy
                | CameraError::NotReserved
                | CameraError::UnknownTaskId(_)
                | CameraError::Cancelled(_)
                | CameraError::CancelAllPartialFailure(_)
                | CameraError::Config(_)
        )
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::DeviceBusy => write!(f, "Camera is busy or not connected"),
            CameraError::NotReserved => write!(f, "Camera is not reserved"),
            CameraError::UnknownTaskId(id) => write!(f, "No task with id '{}'", id),
            CameraError::DuplicateTaskId(id) => write!(f, "Task id '{}' is already in use", id),
            CameraError::CaptureToolFailure { tool, code, stderr } => {
                if stderr.is_empty() {
                    write!(f, "{} exited with code {}", tool, code)
                } else {
                    write!(f, "{} exited with code {}: {}", tool, code, stderr.trim_end())
                }
            }
            CameraError::Cancelled(id) => write!(f, "Task '{}' was cancelled", id),
            CameraError::CancelAllPartialFailure(msg) => {
                write!(f, "Failed to cancel some tasks: {}", msg)
            }
            CameraError::SignalFailed { id, message } => {
                write!(f, "Failed to signal task '{}': {}", id, message)
            }
            CameraError::Spawn { tool, message } => {
                write!(f, "Failed to start {}: {}", tool, message)
            }
            CameraError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<CameraError> for String {
    fn from(err: CameraError) -> Self {
        err.to_string()
    }
}

impl From<&CameraError> for ErrorInfo {
    fn from(err: &CameraError) -> Self {
        ErrorInfo::new(err.kind(), err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CameraError>;
