//! Error types for Ordergrid core.

use thiserror::Error;

/// Errors that can occur in the Ordergrid workbook
#[derive(Error, Debug)]
pub enum OrderGridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("No selection")]
    NoSelection,

    #[error("Clipboard text is empty")]
    EmptyClipboard,

    #[error("No file path set")]
    NoFilePath,

    #[error("Nothing to undo")]
    NothingToUndo,
}

pub type Result<T> = std::result::Result<T, OrderGridError>;
