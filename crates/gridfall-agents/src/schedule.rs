//! Colonist daily schedules.
//!
//! A schedule maps the hour of day to an activity. The default plan gives
//! everyone morning drills, a working day, an evening of recreation, and a
//! sleep block that wraps midnight. Urgent jobs (pressure-gated) override
//! the window in the job board's eligibility check, not here.

use serde::{Deserialize, Serialize};

use gridfall_types::Activity;

/// One block of the daily plan; `start..end` hours, wrapping midnight when
/// `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    /// Start hour, inclusive.
    pub start: u8,
    /// End hour, exclusive.
    pub end: u8,
    /// What the block is for.
    pub activity: Activity,
}

impl ScheduleBlock {
    const fn contains(self, hour: u8) -> bool {
        if self.start <= self.end {
            hour >= self.start && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

/// A colonist's hour-by-hour plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    blocks: Vec<ScheduleBlock>,
}

impl Schedule {
    /// The standard colony day: work 6-18, recreation 18-22, sleep 22-6.
    pub fn standard() -> Self {
        Self {
            blocks: vec![
                ScheduleBlock {
                    start: 6,
                    end: 18,
                    activity: Activity::Work,
                },
                ScheduleBlock {
                    start: 18,
                    end: 22,
                    activity: Activity::Recreation,
                },
                ScheduleBlock {
                    start: 22,
                    end: 6,
                    activity: Activity::Sleep,
                },
            ],
        }
    }

    /// A fighter's day: the first two working hours are morning drills.
    pub fn fighter() -> Self {
        Self {
            blocks: vec![
                ScheduleBlock {
                    start: 6,
                    end: 8,
                    activity: Activity::Training,
                },
                ScheduleBlock {
                    start: 8,
                    end: 18,
                    activity: Activity::Work,
                },
                ScheduleBlock {
                    start: 18,
                    end: 22,
                    activity: Activity::Recreation,
                },
                ScheduleBlock {
                    start: 22,
                    end: 6,
                    activity: Activity::Sleep,
                },
            ],
        }
    }

    /// The activity scheduled for the given hour. Gaps default to work.
    pub fn activity_at(&self, hour: u8) -> Activity {
        self.blocks
            .iter()
            .find(|block| block.contains(hour))
            .map_or(Activity::Work, |block| block.activity)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_day_covers_all_hours() {
        let schedule = Schedule::standard();
        assert_eq!(schedule.activity_at(6), Activity::Work);
        assert_eq!(schedule.activity_at(17), Activity::Work);
        assert_eq!(schedule.activity_at(18), Activity::Recreation);
        assert_eq!(schedule.activity_at(21), Activity::Recreation);
        assert_eq!(schedule.activity_at(22), Activity::Sleep);
        assert_eq!(schedule.activity_at(23), Activity::Sleep);
        assert_eq!(schedule.activity_at(0), Activity::Sleep);
        assert_eq!(schedule.activity_at(5), Activity::Sleep);
    }

    #[test]
    fn fighters_drill_in_the_morning() {
        let schedule = Schedule::fighter();
        assert_eq!(schedule.activity_at(6), Activity::Training);
        assert_eq!(schedule.activity_at(7), Activity::Training);
        assert_eq!(schedule.activity_at(8), Activity::Work);
    }

    #[test]
    fn gaps_default_to_work() {
        let schedule = Schedule { blocks: Vec::new() };
        assert_eq!(schedule.activity_at(3), Activity::Work);
    }
}
