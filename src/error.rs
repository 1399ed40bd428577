//! Error types for the ToyNet client

use thiserror::Error;

pub type ToynetResult<T> = Result<T, ToynetError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToynetError {
    /// 后端返回空值或假值
    #[error("Failed to {operation} {target}: backend rejected the command")]
    Rejected { operation: String, target: String },

    /// 传输层、状态码或响应解析失败
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    #[error("Field {field} must not be empty")]
    InvalidForm { field: String },

    #[error("Session store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ToynetError {
    fn from(err: reqwest::Error) -> Self {
        ToynetError::Http(err.to_string())
    }
}

impl From<rusqlite::Error> for ToynetError {
    fn from(err: rusqlite::Error) -> Self {
        ToynetError::Store(err.to_string())
    }
}

impl From<std::io::Error> for ToynetError {
    fn from(err: std::io::Error) -> Self {
        ToynetError::Config(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for ToynetError {
    fn from(err: serde_json::Error) -> Self {
        ToynetError::Config(format!("JSON error: {}", err))
    }
}
