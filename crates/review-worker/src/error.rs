//! Worker error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Invalid move list: {0}")]
    InvalidMoveList(String),

    #[error("A review is already in progress")]
    ReviewInProgress,

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
