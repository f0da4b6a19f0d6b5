// src/error.rs

use thiserror::Error;

/// Errors that abort an operation. Recoverable generation problems are
/// reported as [`crate::pcg::GenerationIssue`] instead.
#[derive(Debug, Error)]
pub enum LevelGenError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("predefined block placement requested but the block catalog is empty")]
    EmptyCatalog,

    #[error("grid coordinates ({x}, {y}) out of range")]
    OutOfBounds { x: i32, y: i32 },

    #[error("invalid predefined block `{name}`: {reason}")]
    InvalidBlock { name: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, LevelGenError>;

impl LevelGenError {
    pub(crate) fn invalid_block(name: &str, reason: impl Into<String>) -> Self {
        LevelGenError::InvalidBlock {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
