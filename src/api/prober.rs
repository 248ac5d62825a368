//! Status prober

use tracing::{debug, warn};

use super::LichessApi;
use crate::error::ChallengerErrorTrait;
use crate::models::User;

/// Queries online/playing status, swallowing failures
///
/// The prober does not throttle; callers pace their own calls.
pub struct StatusProber<A> {
    api: A,
}

impl<A: LichessApi> StatusProber<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Freshest snapshot of `username`, or `None` if it cannot be determined
    ///
    /// `None` means "cannot confirm availability", never "offline".
    pub async fn probe(&self, username: &str) -> Option<User> {
        match self.api.user_status(username).await {
            Ok(Some(user)) => {
                debug!(
                    username = %user.username,
                    online = user.is_online,
                    playing = ?user.is_playing,
                    "Status received"
                );
                Some(user)
            }
            Ok(None) => {
                warn!(username = %username, "User missing from status response");
                None
            }
            Err(e) => {
                warn!(
                    username = %username,
                    category = %e.category(),
                    error = %e,
                    "Error querying online status"
                );
                None
            }
        }
    }
}
