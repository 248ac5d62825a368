//! Common test utilities

use async_trait::async_trait;
use lichess_challenger::api::LichessApi;
use lichess_challenger::config::PacingConfig;
use lichess_challenger::models::{Challenge, User};
use lichess_challenger::utils::ApiError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted status for one username
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Status {
    Online,
    Offline,
    Playing,
    /// Missing from the status response
    Absent,
    /// Transport failure
    Failing,
    /// Never answers
    Hang,
}

/// In-memory Lichess API that records every call
#[derive(Default)]
pub struct MockApi {
    statuses: Mutex<HashMap<String, Status>>,
    fail_challenges: Mutex<bool>,
    pub status_calls: Mutex<Vec<String>>,
    pub challenges: Mutex<Vec<(String, Challenge)>>,
}

#[allow(dead_code)]
impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, username: &str, status: Status) -> &Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(username.to_lowercase(), status);
        self
    }

    pub fn fail_challenges(&self, fail: bool) {
        *self.fail_challenges.lock().unwrap() = fail;
    }

    pub fn status_calls(&self) -> Vec<String> {
        self.status_calls.lock().unwrap().clone()
    }

    pub fn challenges(&self) -> Vec<(String, Challenge)> {
        self.challenges.lock().unwrap().clone()
    }
}

#[async_trait]
impl LichessApi for MockApi {
    async fn user_status(&self, username: &str) -> Result<Option<User>, ApiError> {
        self.status_calls.lock().unwrap().push(username.to_string());

        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(&username.to_lowercase())
            .cloned()
            .unwrap_or(Status::Online);

        match status {
            Status::Online => Ok(Some(User::new(username, true, None))),
            Status::Offline => Ok(Some(User::new(username, false, None))),
            Status::Playing => Ok(Some(User::new(username, true, Some(true)))),
            Status::Absent => Ok(None),
            Status::Failing => Err(ApiError::ServerError(503)),
            Status::Hang => std::future::pending().await,
        }
    }

    async fn create_challenge(
        &self,
        username: &str,
        challenge: &Challenge,
    ) -> Result<(), ApiError> {
        self.challenges
            .lock()
            .unwrap()
            .push((username.to_string(), challenge.clone()));

        if *self.fail_challenges.lock().unwrap() {
            Err(ApiError::Status(400))
        } else {
            Ok(())
        }
    }
}

/// Default pacing intervals from the config defaults
#[allow(dead_code)]
pub fn default_pacing() -> PacingConfig {
    PacingConfig::default()
}

/// Sum of every wait in a successful cycle with default pacing
#[allow(dead_code)]
pub fn full_cycle_duration() -> Duration {
    let pacing = default_pacing();
    pacing.time_between_challenges()
        + pacing.time_between_find_user_requests()
        + pacing.challenge_settle()
}

#[allow(dead_code)]
pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
