//! Rotation cursor over the roster
//!
//! One full pass over the bots happens per time control: the time-control
//! index moves only when the bot index wraps back to zero.

/// Position within the bot and time-control sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationCursor {
    bot_index: usize,
    time_control_index: usize,
    bot_count: usize,
    time_control_count: usize,
}

impl RotationCursor {
    /// Cursor at (0, 0) over sequences of the given lengths
    ///
    /// # Panics
    ///
    /// Panics if either length is zero; the roster never produces empty
    /// sequences.
    pub fn new(bot_count: usize, time_control_count: usize) -> Self {
        assert!(bot_count > 0, "rotation needs at least one bot");
        assert!(
            time_control_count > 0,
            "rotation needs at least one time control"
        );

        Self {
            bot_index: 0,
            time_control_index: 0,
            bot_count,
            time_control_count,
        }
    }

    /// Move to the next bot, and to the next time control on wrap-around
    ///
    /// Returns the new `(bot_index, time_control_index)`.
    pub fn advance(&mut self) -> (usize, usize) {
        self.bot_index = (self.bot_index + 1) % self.bot_count;
        if self.bot_index == 0 {
            self.time_control_index = (self.time_control_index + 1) % self.time_control_count;
        }
        (self.bot_index, self.time_control_index)
    }

    pub fn bot_index(&self) -> usize {
        self.bot_index
    }

    pub fn time_control_index(&self) -> usize {
        self.time_control_index
    }
}
