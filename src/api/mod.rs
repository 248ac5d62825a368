//! Lichess API access
//!
//! - [`LichessApi`] - the transport seam used by the scheduler
//! - [`client`] - reqwest implementation with bearer auth and retries
//! - [`prober`] - status queries that never fail, only report "unknown"
//! - [`issuer`] - challenge creation with failure logging

pub mod client;
pub mod issuer;
pub mod prober;

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{Challenge, User};
use crate::utils::error::ApiError;

pub use client::LichessClient;
pub use issuer::ChallengeIssuer;
pub use prober::StatusProber;

/// Outbound calls the challenger makes
///
/// Implementations own their retry policy; callers see a single result per
/// call.
#[async_trait]
pub trait LichessApi: Send + Sync {
    /// Current status of `username`, or `None` when the service does not
    /// report that user
    async fn user_status(&self, username: &str) -> Result<Option<User>, ApiError>;

    /// Send `challenge` to `username`
    async fn create_challenge(&self, username: &str, challenge: &Challenge)
        -> Result<(), ApiError>;
}

#[async_trait]
impl<T> LichessApi for Arc<T>
where
    T: LichessApi + ?Sized,
{
    async fn user_status(&self, username: &str) -> Result<Option<User>, ApiError> {
        (**self).user_status(username).await
    }

    async fn create_challenge(
        &self,
        username: &str,
        challenge: &Challenge,
    ) -> Result<(), ApiError> {
        (**self).create_challenge(username, challenge).await
    }
}
