//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Forum API error: {0}")]
    Forum(#[from] xenforo_client::XfError),

    #[error("Chat backend error: {0}")]
    Chat(#[from] napcat_client::NapCatError),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
