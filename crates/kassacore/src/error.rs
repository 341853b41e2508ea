use thiserror::Error;

/// Centralized error types for the relay services.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP/transport errors from the remote API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// QR encoding errors
    #[error("QR encoding error: {0}")]
    Qr(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
