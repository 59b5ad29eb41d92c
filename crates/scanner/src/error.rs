//! Scanner error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised by [`crate::bookmarks::BookmarkStore`] implementations.
    #[error("Storage error: {0}")]
    Storage(String),
}
