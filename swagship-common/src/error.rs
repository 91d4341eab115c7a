// ================================================================
// File: swagship-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Accumulated input-validation failures; the caller gets every
    /// violated rule at once rather than the first one only.
    #[error("Please correct the following:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("Invalid redemption code: {0}")]
    InvalidCode(String),

    #[error("Redemption code has already been used: {0}")]
    AlreadyRedeemed(String),

    #[error("Duplicate redemption code: {0}")]
    DuplicateKey(String),

    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl Error {
    /// True for business-rule and input errors that the request boundary
    /// reports inside a `{status: FAILED, message}` body; transport errors
    /// (database, upstream HTTP) stay generic failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::InvalidCode(_)
                | Error::AlreadyRedeemed(_)
                | Error::DuplicateKey(_)
                | Error::NotFound(_)
                | Error::Parse(_)
        )
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}
