//! The game clock.
//!
//! Time is tick-derived: hour, minute, day, and day-night band are all
//! computed from the tick counter and the configured tick rates. The clock
//! starts at 06:00 on day 1 so a fresh colony wakes into morning drills
//! instead of the middle of the night.

use serde::{Deserialize, Serialize};

use gridfall_types::TimeOfDay;

/// Errors from clock construction.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick rates must be nonzero and consistent.
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },
}

/// Tick-derived time of day and calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    /// Ticks into the current day.
    ticks_today: u64,
    /// Day number, starting at 1.
    day: u32,
    /// Ticks per in-game hour.
    ticks_per_hour: u64,
    /// Ticks per in-game day.
    ticks_per_day: u64,
}

impl GameClock {
    /// Create a clock starting at 06:00 on day 1.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if either rate is zero or the
    /// day is not a whole number of hours.
    pub fn new(ticks_per_hour: u64, ticks_per_day: u64) -> Result<Self, ClockError> {
        if ticks_per_hour == 0 || ticks_per_day == 0 {
            return Err(ClockError::InvalidConfig {
                reason: String::from("tick rates must be nonzero"),
            });
        }
        if ticks_per_day.checked_rem(ticks_per_hour) != Some(0) {
            return Err(ClockError::InvalidConfig {
                reason: String::from("ticks_per_day must be a multiple of ticks_per_hour"),
            });
        }
        Ok(Self {
            ticks_today: ticks_per_hour.saturating_mul(6).min(ticks_per_day.saturating_sub(1)),
            day: 1,
            ticks_per_hour,
            ticks_per_day,
        })
    }

    /// Advance one tick, rolling the day over at midnight.
    pub fn advance(&mut self) {
        self.ticks_today = self.ticks_today.saturating_add(1);
        if self.ticks_today >= self.ticks_per_day {
            self.ticks_today = 0;
            self.day = self.day.saturating_add(1);
        }
    }

    /// Day number, starting at 1.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Current hour (0-23).
    pub fn hour(&self) -> u8 {
        let hour = self
            .ticks_today
            .checked_div(self.ticks_per_hour)
            .unwrap_or(0);
        u8::try_from(hour.min(23)).unwrap_or(23)
    }

    /// Current minute (0-59).
    pub fn minute(&self) -> u8 {
        let into_hour = self
            .ticks_today
            .checked_rem(self.ticks_per_hour)
            .unwrap_or(0);
        let minute = into_hour
            .saturating_mul(60)
            .checked_div(self.ticks_per_hour)
            .unwrap_or(0);
        u8::try_from(minute.min(59)).unwrap_or(59)
    }

    /// The day-night band for the current hour.
    pub fn time_of_day(&self) -> TimeOfDay {
        match self.hour() {
            5 | 6 => TimeOfDay::Dawn,
            7..=18 => TimeOfDay::Day,
            19 | 20 => TimeOfDay::Dusk,
            _ => TimeOfDay::Night,
        }
    }

    /// Whether the colony-wide sleep band is on (21:00-06:00).
    pub fn is_sleep_time(&self) -> bool {
        let hour = self.hour();
        hour >= 21 || hour < 6
    }

    /// Formatted `"Day 3, 14:30"` display string.
    pub fn display_string(&self) -> String {
        format!("Day {}, {:02}:{:02}", self.day, self.hour(), self.minute())
    }
}
