//! Error types shared across the workspace.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NudgeError>;

#[derive(Debug, Error)]
pub enum NudgeError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
