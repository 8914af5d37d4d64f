//! Error types for pagegrid library.
//!
//! Layout conditions that the engine recovers from (merge conflicts,
//! unsupported nodes, malformed spans) are not errors; they are reported as
//! [`Diagnostic`](crate::grid::Diagnostic) values next to each grid.

use std::io;
use thiserror::Error;

/// Result type alias for pagegrid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading content or building grids.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Content or output JSON could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Grid options failed validation.
    #[error("Invalid grid options: {0}")]
    InvalidOptions(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Page selection string could not be parsed.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Error during rendering (JSON, text).
    #[error("Rendering error: {0}")]
    Render(String),
}
