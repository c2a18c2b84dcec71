use thiserror::Error;

/// Errors raised while persisting or restoring the agent's knowledge.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write episode log: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed Q-table: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
