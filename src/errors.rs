// SPDX-License-Identifier: GPL-3.0-only

//! Error types for frame analysis and capture control

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Frame construction errors
    Frame(FrameError),
    /// Capture-control negotiation errors
    Control(ControlError),
    /// Configuration errors
    Config(String),
    /// Filesystem errors
    Io(String),
    /// Generic error with message
    Other(String),
}

/// Invalid frame geometry
///
/// Only raised when a [`LumaFrame`](crate::app::frame_processor::LumaFrame) is
/// built. Analysis of an already constructed frame never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Width or height is zero
    EmptyDimensions { width: u32, height: u32 },
    /// Row stride shorter than the row width
    StrideTooSmall { stride: u32, width: u32 },
    /// Backing buffer does not cover the last row
    BufferTooSmall { len: usize, required: usize },
}

/// Rejection signalled by the hardware apply operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRejection {
    pub reason: String,
}

impl ControlRejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Capture-control negotiation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// The terminal fully-automatic request was rejected.
    ///
    /// A compliant device accepts pure auto, so this is an integration bug.
    FallbackRejected(String),
    /// Negotiation was abandoned before a tier was accepted
    Cancelled,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Frame(e) => write!(f, "Frame error: {}", e),
            AppError::Control(e) => write!(f, "Control error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Io(msg) => write!(f, "I/O error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::EmptyDimensions { width, height } => {
                write!(f, "Frame has empty dimensions {}x{}", width, height)
            }
            FrameError::StrideTooSmall { stride, width } => {
                write!(f, "Row stride {} is shorter than width {}", stride, width)
            }
            FrameError::BufferTooSmall { len, required } => {
                write!(f, "Buffer of {} bytes, frame needs {}", len, required)
            }
        }
    }
}

impl fmt::Display for ControlRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request rejected: {}", self.reason)
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::FallbackRejected(reason) => {
                write!(f, "Fully automatic fallback rejected: {}", reason)
            }
            ControlError::Cancelled => write!(f, "Negotiation cancelled"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for FrameError {}
impl std::error::Error for ControlRejection {}
impl std::error::Error for ControlError {}

impl From<FrameError> for AppError {
    fn from(err: FrameError) -> Self {
        AppError::Frame(err)
    }
}

impl From<ControlError> for AppError {
    fn from(err: ControlError) -> Self {
        AppError::Control(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}
