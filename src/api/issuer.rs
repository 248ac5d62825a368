//! Challenge issuer

use tracing::{debug, error};

use super::LichessApi;
use crate::error::ChallengerErrorTrait;
use crate::models::Challenge;
use crate::utils::error::ApiError;

/// Sends challenge requests and logs their outcome
pub struct ChallengeIssuer<A> {
    api: A,
}

impl<A: LichessApi> ChallengeIssuer<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Challenge `username` with `challenge`
    ///
    /// Failures are logged with the opponent's name before being returned;
    /// retries already happened in the transport.
    pub async fn issue(&self, username: &str, challenge: &Challenge) -> Result<(), ApiError> {
        match self.api.create_challenge(username, challenge).await {
            Ok(()) => {
                debug!(username = %username, time_control = %challenge, "Challenge sent");
                Ok(())
            }
            Err(e) => {
                error!(
                    username = %username,
                    category = %e.category(),
                    recoverable = e.is_recoverable(),
                    error = %e,
                    "Error challenging"
                );
                Err(e)
            }
        }
    }
}
