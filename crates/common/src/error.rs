//! Error types shared across MatchPose crates.
//!
//! Only model-load and stream-authorization failures are actionable by a
//! caller; per-frame detection and per-window classification failures are
//! absorbed inside the engine and never escape a running pipeline.

use std::path::PathBuf;

/// Top-level error type for MatchPose operations.
#[derive(Debug, thiserror::Error)]
pub enum MatchposeError {
    #[error("Model load error: {message}")]
    ModelLoad { message: String },

    #[error("Stream authorization denied: {message}")]
    Authorization { message: String },

    #[error("Detection error: {message}")]
    Detection { message: String },

    #[error("Classification error: {message}")]
    Classification { message: String },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MatchposeError.
pub type MatchposeResult<T> = Result<T, MatchposeError>;

impl MatchposeError {
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad {
            message: msg.into(),
        }
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization {
            message: msg.into(),
        }
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection {
            message: msg.into(),
        }
    }

    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification {
            message: msg.into(),
        }
    }

    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether the error should abort session activation.
    ///
    /// Detection and classification errors are recoverable per frame or
    /// per window and must never tear down a running session.
    pub fn is_activation_failure(&self) -> bool {
        matches!(
            self,
            Self::ModelLoad { .. } | Self::Authorization { .. }
        )
    }
}
