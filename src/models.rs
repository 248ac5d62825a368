//! Core data structures for the challenger
//!
//! This module contains the account snapshot returned by status queries and
//! the time-control template sent with every challenge.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Case-insensitive username comparison
pub fn same_username(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

// ============================================================================
// User
// ============================================================================

/// A point-in-time snapshot of a Lichess account
///
/// Each status query produces fresh values; snapshots are never updated in
/// place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "name")]
    pub username: String,

    #[serde(rename = "online", default)]
    pub is_online: bool,

    /// Lichess omits the field when the user is not playing
    #[serde(rename = "playing", default, skip_serializing_if = "Option::is_none")]
    pub is_playing: Option<bool>,
}

impl User {
    /// Create a snapshot with explicit status fields
    pub fn new(username: impl Into<String>, is_online: bool, is_playing: Option<bool>) -> Self {
        Self {
            username: username.into(),
            is_online,
            is_playing,
        }
    }

    /// Whether this snapshot belongs to `username`
    pub fn is(&self, username: &str) -> bool {
        same_username(&self.username, username)
    }

    /// Busy if explicitly playing; an unknown playing flag counts as free
    pub fn availability(&self) -> Availability {
        if !self.is_online {
            Availability::Offline
        } else if self.is_playing == Some(true) {
            Availability::Playing
        } else {
            Availability::Available
        }
    }
}

/// Whether an account can take part in a new game right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    Available,
    Offline,
    Playing,
    /// Status could not be determined (transport failure or user missing)
    Unknown,
}

impl Availability {
    /// Availability of an optional probe result
    pub fn of(user: Option<&User>) -> Self {
        user.map_or(Self::Unknown, User::availability)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Available => "available",
            Self::Offline => "offline",
            Self::Playing => "playing",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

// ============================================================================
// Challenge
// ============================================================================

/// Side requested for the challenger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    Random,
    White,
    Black,
}

/// Immutable time-control template sent as the challenge payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Initial clock in seconds
    #[serde(rename = "clock.limit", alias = "clock_limit")]
    pub clock_limit: u32,

    /// Increment per move in seconds
    #[serde(rename = "clock.increment", alias = "clock_increment")]
    pub clock_increment: u32,

    #[serde(default)]
    pub color: Color,

    #[serde(default = "default_variant")]
    pub variant: String,

    #[serde(default = "default_rated")]
    pub rated: bool,
}

fn default_variant() -> String {
    String::from("standard")
}

fn default_rated() -> bool {
    true
}

impl Challenge {
    /// Standard, rated, random-color challenge
    pub fn new(clock_limit: u32, clock_increment: u32) -> Self {
        Self {
            clock_limit,
            clock_increment,
            color: Color::default(),
            variant: default_variant(),
            rated: default_rated(),
        }
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.clock_limit / 60, self.clock_increment)
    }
}
