use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitbeakerError {
    #[error("Requester must be passed")]
    MissingRequester,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GitbeakerError>;
