//! Challenge rotation scheduler
//!
//! A single cooperative loop that, every cycle:
//!
//! ```text
//! Idle ──► CheckSelf ──► SelectCandidate ──► CheckCandidate ──► Challenge ──► Idle
//!   ▲          │                                   │                            │
//!   └──────────┴───────────── skip ────────────────┴────────────────────────────┘
//! ```
//!
//! - `Idle` waits `time_between_challenges`
//! - `CheckSelf` probes the agent's own account; a failure here leaves the
//!   cursor untouched, so whose turn it is does not depend on our availability
//! - `SelectCandidate` advances the [`RotationCursor`]
//! - `CheckCandidate` waits `time_between_find_user_requests`, then probes the
//!   candidate; the cursor stays advanced whatever the outcome
//! - `Challenge` sends the request, then waits `challenge_settle`
//!
//! Every wait and every outbound call is raced against the [`ShutdownSignal`].

pub mod rotation;

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::api::{ChallengeIssuer, LichessApi, LichessClient, StatusProber};
use crate::config::{Config, PacingConfig, USERNAME_ENV};
use crate::error::{Error, Result};
use crate::models::{Availability, Challenge};
use crate::roster::Roster;
use crate::utils::shutdown::ShutdownSignal;

pub use rotation::RotationCursor;

/// How a single cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Own account offline, playing or unknown; cursor not advanced
    SelfUnavailable(Availability),

    /// Candidate offline, playing or unknown; cursor already advanced
    CandidateUnavailable {
        candidate: String,
        availability: Availability,
    },

    /// The challenge request failed
    ChallengeFailed {
        candidate: String,
        time_control: Challenge,
    },

    /// The challenge request succeeded
    ChallengeSent {
        candidate: String,
        time_control: Challenge,
        challenge_count: u64,
    },

    /// Cancellation observed before the cycle finished
    Cancelled,
}

/// Owns the rotation state and drives the challenge loop
pub struct ChallengeScheduler<A> {
    username: String,
    roster: Roster,
    pacing: PacingConfig,
    cursor: RotationCursor,
    challenge_count: u64,
    prober: StatusProber<A>,
    issuer: ChallengeIssuer<A>,
}

impl ChallengeScheduler<Arc<LichessClient>> {
    /// Build the roster and an authenticated client from configuration
    ///
    /// # Errors
    ///
    /// Every failure here is fatal at startup: a missing credential, an
    /// unusable base URL or token, or an empty roster.
    pub fn from_config<R>(config: &Config, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let username = config
            .username()
            .ok_or_else(|| Error::config(format!("Missing essential config: {USERNAME_ENV}")))?;
        let roster = Roster::from_config(config, rng)?;
        let client = LichessClient::from_config(config)?;

        Ok(Self::new(
            username,
            roster,
            config.pacing.clone(),
            Arc::new(client),
        ))
    }
}

impl<A> ChallengeScheduler<A>
where
    A: LichessApi + Clone,
{
    /// Create a scheduler for `username` over an assembled roster
    pub fn new(username: impl Into<String>, roster: Roster, pacing: PacingConfig, api: A) -> Self {
        let cursor = RotationCursor::new(roster.bots().len(), roster.time_controls().len());

        Self {
            username: username.into(),
            roster,
            pacing,
            cursor,
            challenge_count: 0,
            prober: StatusProber::new(api.clone()),
            issuer: ChallengeIssuer::new(api),
        }
    }

    pub fn cursor(&self) -> RotationCursor {
        self.cursor
    }

    /// Successful challenges since start
    pub fn challenge_count(&self) -> u64 {
        self.challenge_count
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Run cycles until cancelled; returns the number of challenges sent
    pub async fn run(&mut self, mut shutdown: ShutdownSignal) -> u64 {
        info!(
            username = %self.username,
            bots = self.roster.bots().len(),
            time_controls = self.roster.time_controls().len(),
            "Challenge loop starting"
        );

        loop {
            let outcome = self.run_cycle(&mut shutdown).await;
            if outcome == CycleOutcome::Cancelled {
                break;
            }
            debug!(outcome = ?outcome, "Cycle finished");
        }

        info!(
            challenge_count = self.challenge_count,
            "Challenge loop stopped"
        );
        self.challenge_count
    }

    /// Execute exactly one cycle, from `Idle` back to `Idle`
    pub async fn run_cycle(&mut self, shutdown: &mut ShutdownSignal) -> CycleOutcome {
        // Idle
        if !pause(shutdown, self.pacing.time_between_challenges()).await {
            return CycleOutcome::Cancelled;
        }

        // CheckSelf
        let Some(me) = shutdown
            .run_until_cancelled(self.prober.probe(&self.username))
            .await
        else {
            return CycleOutcome::Cancelled;
        };

        let own = Availability::of(me.as_ref());
        if !own.is_available() {
            debug!(username = %self.username, availability = %own, "Not available, skipping cycle");
            return CycleOutcome::SelfUnavailable(own);
        }

        // SelectCandidate
        let (bot_index, time_control_index) = self.cursor.advance();
        let candidate = self.roster.bot(bot_index).to_string();
        let time_control = self.roster.time_control(time_control_index).clone();

        // CheckCandidate
        if !pause(shutdown, self.pacing.time_between_find_user_requests()).await {
            return CycleOutcome::Cancelled;
        }

        info!(
            bot_index = bot_index,
            candidate = %candidate,
            time_control = %time_control,
            "Trying to challenge"
        );

        let Some(rival) = shutdown
            .run_until_cancelled(self.prober.probe(&candidate))
            .await
        else {
            return CycleOutcome::Cancelled;
        };

        let availability = Availability::of(rival.as_ref());
        if !availability.is_available() {
            debug!(candidate = %candidate, availability = %availability, "Candidate not available");
            return CycleOutcome::CandidateUnavailable {
                candidate,
                availability,
            };
        }

        // Challenge
        let Some(result) = shutdown
            .run_until_cancelled(self.issuer.issue(&candidate, &time_control))
            .await
        else {
            return CycleOutcome::Cancelled;
        };

        let outcome = match result {
            Ok(()) => {
                self.challenge_count += 1;
                info!(
                    candidate = %candidate,
                    challenge_count = self.challenge_count,
                    "Challenge created"
                );
                CycleOutcome::ChallengeSent {
                    candidate,
                    time_control,
                    challenge_count: self.challenge_count,
                }
            }
            Err(e) => {
                debug!(candidate = %candidate, error = %e, "Challenge failed, continuing");
                CycleOutcome::ChallengeFailed {
                    candidate,
                    time_control,
                }
            }
        };

        if !pause(shutdown, self.pacing.challenge_settle()).await {
            return CycleOutcome::Cancelled;
        }

        outcome
    }
}

/// Sleep for `duration`; `false` if cancelled first
async fn pause(shutdown: &mut ShutdownSignal, duration: Duration) -> bool {
    if duration.is_zero() {
        return !shutdown.is_cancelled();
    }
    shutdown
        .run_until_cancelled(tokio::time::sleep(duration))
        .await
        .is_some()
}
