//! Roster assembly
//!
//! Builds the ordered opponent list and time-control list once at startup.
//! Pools are concatenated in the fixed [`BotCategory::all`] order, optionally
//! shuffled as a whole, and the agent's own account is dropped.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, RosterConfig, USERNAME_ENV};
use crate::error::{Error, Result};
use crate::models::{same_username, Challenge};

/// Startup failures while assembling the roster
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("No opponents to play: enable at least one non-empty bot pool")]
    NoOpponents,

    #[error("No time controls configured")]
    NoTimeControls,
}

/// Strength category of a configured bot pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotCategory {
    Weak,
    Average,
    Strong,
}

impl BotCategory {
    /// All categories, in concatenation order
    pub fn all() -> [Self; 3] {
        [Self::Weak, Self::Average, Self::Strong]
    }
}

impl fmt::Display for BotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Weak => "weak",
            Self::Average => "average",
            Self::Strong => "strong",
        };
        f.write_str(label)
    }
}

/// The assembled opponents and time controls; fixed after assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    bots: Vec<String>,
    time_controls: Vec<Challenge>,
}

impl Roster {
    /// Assemble the roster for the configured account
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` without a username and `Error::Roster` when
    /// assembly leaves a sequence empty.
    pub fn from_config<R>(config: &Config, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let username = config
            .username()
            .ok_or_else(|| Error::config(format!("Missing essential config: {USERNAME_ENV}")))?;

        Ok(Self::assemble(
            &config.roster,
            &config.time_controls,
            username,
            rng,
        )?)
    }

    /// Assemble the roster from the pool configuration
    ///
    /// `rng` is only consulted when a randomization flag is set.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] when either sequence ends up empty.
    pub fn assemble<R>(
        config: &RosterConfig,
        time_controls: &[Challenge],
        own_username: &str,
        rng: &mut R,
    ) -> std::result::Result<Self, RosterError>
    where
        R: Rng + ?Sized,
    {
        let mut bots: Vec<String> = Vec::new();
        for category in BotCategory::all() {
            if !config.is_enabled(category) {
                continue;
            }
            let pool = config.pool(category);
            debug!(category = %category, bots = pool.len(), "Adding bot pool");
            bots.extend(pool.iter().cloned());
        }

        if config.randomize_bot_order {
            bots.shuffle(rng);
        }

        // Only the first match goes; a name listed in two pools stays once.
        if let Some(position) = bots.iter().position(|bot| same_username(bot, own_username)) {
            let removed = bots.remove(position);
            debug!(username = %removed, "Removed own account from opponents");
        }

        let mut time_controls = time_controls.to_vec();
        if config.randomize_time_control_order {
            time_controls.shuffle(rng);
        }

        Self::new(bots, time_controls)
    }

    /// Build a roster from already-ordered sequences
    pub fn new(
        bots: Vec<String>,
        time_controls: Vec<Challenge>,
    ) -> std::result::Result<Self, RosterError> {
        if bots.is_empty() {
            return Err(RosterError::NoOpponents);
        }
        if time_controls.is_empty() {
            return Err(RosterError::NoTimeControls);
        }

        info!(
            bots = bots.len(),
            time_controls = time_controls.len(),
            "Roster assembled"
        );

        Ok(Self {
            bots,
            time_controls,
        })
    }

    pub fn bots(&self) -> &[String] {
        &self.bots
    }

    pub fn time_controls(&self) -> &[Challenge] {
        &self.time_controls
    }

    pub fn bot(&self, index: usize) -> &str {
        &self.bots[index]
    }

    pub fn time_control(&self, index: usize) -> &Challenge {
        &self.time_controls[index]
    }
}
