//! Error types for the seismic dashboard pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::extent::Axis;

/// Result type alias using SeismicError.
pub type SeismicResult<T> = Result<T, SeismicError>;

/// Primary error type for every pipeline stage.
#[derive(Debug, Error)]
pub enum SeismicError {
    // === Input Errors ===
    #[error("Raster file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to decode raster: {0}")]
    Decode(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    // === Interpolation Errors ===
    #[error("No input points: {0}")]
    EmptyInput(String),

    #[error("Degenerate coordinate range on {axis} axis: all points share {axis} = {value}")]
    DegenerateRange { axis: Axis, value: f64 },

    // === Dashboard Errors ===
    #[error("Panel slot ({column}, {row}) is outside the {columns}x{rows} layout")]
    Layout {
        column: usize,
        row: usize,
        columns: usize,
        rows: usize,
    },

    #[error("Dashboard is {state}: {message}")]
    InvalidState { state: String, message: String },

    // === Output Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Payload-free discriminant of [`SeismicError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FileNotFound,
    Decode,
    Config,
    EmptyInput,
    DegenerateRange,
    Layout,
    InvalidState,
    Render,
    Io,
}

impl SeismicError {
    /// Create a Decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an EmptyInput error.
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    /// Create a Render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create an InvalidState error.
    pub fn invalid_state(state: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidState {
            state: state.into(),
            message: msg.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SeismicError::FileNotFound(_) => ErrorKind::FileNotFound,
            SeismicError::Decode(_) => ErrorKind::Decode,
            SeismicError::Config(_) => ErrorKind::Config,
            SeismicError::EmptyInput(_) => ErrorKind::EmptyInput,
            SeismicError::DegenerateRange { .. } => ErrorKind::DegenerateRange,
            SeismicError::Layout { .. } => ErrorKind::Layout,
            SeismicError::InvalidState { .. } => ErrorKind::InvalidState,
            SeismicError::Render(_) => ErrorKind::Render,
            SeismicError::Io(_) => ErrorKind::Io,
        }
    }

    /// Process exit code used by the dashboard binary.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::FileNotFound | ErrorKind::Decode => 3,
            ErrorKind::Config | ErrorKind::Layout => 2,
            ErrorKind::EmptyInput | ErrorKind::DegenerateRange => 4,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for SeismicError {
    fn from(err: serde_json::Error) -> Self {
        SeismicError::Config(format!("JSON error: {}", err))
    }
}
