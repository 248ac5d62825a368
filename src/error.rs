//! Unified error handling for the challenger crate
//!
//! Domain errors ([`ApiError`], [`RosterError`]) are wrapped by a single
//! [`Error`] enum used at module boundaries and by the binary.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lichess_challenger::error::{ChallengerErrorTrait, Error};
//!
//! fn handle_error(err: Error) -> u8 {
//!     tracing::error!(category = %err.category(), error = %err, "Fatal startup error");
//!     err.exit_code()
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::roster::RosterError;
pub use crate::utils::error::ApiError;

/// Common trait for challenger error types
pub trait ChallengerErrorTrait: std::error::Error {
    /// Check if this error is recoverable (the loop may continue)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network failures and server errors
    Network,
    /// HTTP 429 from the remote service
    RateLimit,
    /// Configuration and validation errors
    Config,
    /// Roster assembly errors
    Roster,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Process exit status for a fatal error of this category (sysexits.h)
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Network => 69,   // EX_UNAVAILABLE
            Self::RateLimit => 75, // EX_TEMPFAIL
            Self::Config => 78,    // EX_CONFIG
            Self::Roster => 65,    // EX_DATAERR
            Self::Other => 1,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Network => "network",
            Self::RateLimit => "rate_limit",
            Self::Config => "config",
            Self::Roster => "roster",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Unified error type for the challenger crate
#[derive(Error, Debug)]
pub enum Error {
    /// Lichess API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Roster assembly errors
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl ChallengerErrorTrait for ApiError {
    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::RateLimited => ErrorCategory::RateLimit,
            Self::InvalidConfig(_) => ErrorCategory::Config,
            Self::Decode(_) => ErrorCategory::Other,
            _ => ErrorCategory::Network,
        }
    }
}

impl ChallengerErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Api(e) => e.is_recoverable(),
            Self::Roster(_) => false,
            Self::Io(_) => false,
            Self::Config(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Api(e) => e.category(),
            Self::Roster(_) => ErrorCategory::Roster,
            Self::Io(_) | Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl Error {
    /// Exit status when this error stops the process
    ///
    /// Recoverable errors map to `EX_TEMPFAIL` so a supervisor retries later.
    pub fn exit_code(&self) -> u8 {
        if self.is_recoverable() {
            ErrorCategory::RateLimit.exit_code()
        } else {
            self.category().exit_code()
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
