//! lichess-challenger - rotating challenge agent for Lichess bots
//!
//! The agent repeatedly checks its own availability, picks the next opponent
//! and time control from configured pools, checks the opponent, and sends a
//! challenge, tolerating transient failures and rate limits along the way.
//!
//! # Architecture
//!
//! - [`config`] - Configuration loading and validation
//! - [`models`] - Account snapshots and challenge templates
//! - [`roster`] - Opponent and time-control roster assembly
//! - [`api`] - Lichess client, status prober and challenge issuer
//! - [`scheduler`] - The rotation loop and its cursor
//! - [`utils`] - Retry policies, shutdown signalling, API errors
//!
//! # Example
//!
//! ```no_run
//! use lichess_challenger::prelude::*;
//! use rand::SeedableRng;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load(None)?;
//!     let mut rng = rand_chacha::ChaCha8Rng::from_entropy();
//!     let mut scheduler = ChallengeScheduler::from_config(&config, &mut rng)?;
//!
//!     let (handle, signal) = shutdown_channel();
//!     handle.shutdown();
//!     scheduler.run(signal).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod roster;
pub mod scheduler;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{ChallengeIssuer, LichessApi, LichessClient, StatusProber};
    pub use crate::config::Config;
    pub use crate::error::{ChallengerErrorTrait, Error, ErrorCategory, Result};
    pub use crate::models::{Availability, Challenge, Color, User};
    pub use crate::roster::{BotCategory, Roster, RosterError};
    pub use crate::scheduler::{ChallengeScheduler, CycleOutcome, RotationCursor};
    pub use crate::utils::{shutdown_channel, ApiError, RetryConfig, RetryStack, ShutdownSignal};
}

pub use models::{Availability, Challenge, User};
