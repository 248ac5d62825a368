//! Error types for outbound Lichess calls
//!
//! The retry stack keys off [`ApiError::is_transient`] and
//! [`ApiError::is_rate_limited`], so every transport failure must land in
//! exactly one of those classes (or neither, for permanent failures).

use thiserror::Error;

/// Errors that can occur while talking to the Lichess API
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP transport failure (connect, reset, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 429 Too Many Requests
    #[error("Rate limit exceeded")]
    RateLimited,

    /// 5xx response
    #[error("Server error: {0}")]
    ServerError(u16),

    /// 404 response
    #[error("Not found")]
    NotFound,

    /// Request timeout, either client side or 408
    #[error("Request timeout")]
    Timeout,

    /// Any other non-success status, not retried
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// Response body could not be decoded
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid client configuration (bad base URL, bad token header)
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// Map a non-success HTTP status onto an error variant
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            404 => Self::NotFound,
            408 => Self::Timeout,
            500..=599 => Self::ServerError(status),
            _ => Self::Status(status),
        }
    }

    /// Network failures, server errors and "not found" are retried with
    /// exponential backoff
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::ServerError(_) | Self::NotFound | Self::Timeout
        )
    }

    /// 429 responses are retried on their own, fixed schedule
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}
