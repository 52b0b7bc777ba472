//! Weekly time slot model.
//!
//! A slot is the atomic unit of conflict detection: one weekday plus a
//! half-open clock interval `[start, end)`. Slots are produced only by the
//! time-code decoder (see [`crate::timecode`]).
//!
//! # Sentinel
//! Codes that cannot be decoded map to [`Slot::Unscheduled`]. The sentinel
//! never conflicts with anything, including another `Unscheduled` slot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Working day of the academic week.
///
/// Schedule codes number the days from 2 (Monday) to 7 (Saturday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All working days in calendar order.
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Maps a schedule-code day digit (`'2'..='7'`) to a weekday.
    pub fn from_code_digit(digit: char) -> Option<Self> {
        match digit {
            '2' => Some(Weekday::Monday),
            '3' => Some(Weekday::Tuesday),
            '4' => Some(Weekday::Wednesday),
            '5' => Some(Weekday::Thursday),
            '6' => Some(Weekday::Friday),
            '7' => Some(Weekday::Saturday),
            _ => None,
        }
    }

    /// Three-letter English abbreviation.
    pub fn short_name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Wall-clock time of day with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Creates a clock time from hours and minutes.
    ///
    /// Returns `None` for values outside `00:00..=23:59`.
    pub const fn hm(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour * 60 + minute))
        } else {
            None
        }
    }

    /// Table constructor; callers guarantee `minutes < 24 * 60`.
    pub(crate) const fn at(minutes: u16) -> Self {
        Self(minutes)
    }

    /// Minutes elapsed since midnight.
    #[inline]
    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Hour component.
    #[inline]
    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    /// Minute component.
    #[inline]
    pub fn minute(&self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// A weekly time slot.
///
/// Ordering is weekday first, then start time, which keeps slot sets in
/// calendar order. `Unscheduled` sorts after every timed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// A concrete `[start, end)` interval on a weekday.
    Timed {
        weekday: Weekday,
        start: ClockTime,
        end: ClockTime,
    },
    /// Sentinel for schedule codes that could not be decoded.
    Unscheduled,
}

impl Slot {
    /// Creates a timed slot.
    pub fn timed(weekday: Weekday, start: ClockTime, end: ClockTime) -> Self {
        Slot::Timed {
            weekday,
            start,
            end,
        }
    }

    /// Whether this is the `Unscheduled` sentinel.
    #[inline]
    pub fn is_unscheduled(&self) -> bool {
        matches!(self, Slot::Unscheduled)
    }

    /// Weekday of a timed slot.
    pub fn weekday(&self) -> Option<Weekday> {
        match self {
            Slot::Timed { weekday, .. } => Some(*weekday),
            Slot::Unscheduled => None,
        }
    }

    /// Duration in minutes (0 for the sentinel).
    pub fn duration_minutes(&self) -> u16 {
        match self {
            Slot::Timed { start, end, .. } => end.minutes().saturating_sub(start.minutes()),
            Slot::Unscheduled => 0,
        }
    }

    /// Whether two slots occupy overlapping time.
    ///
    /// The sentinel never overlaps anything.
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Slot::Timed {
                    weekday: d1,
                    start: s1,
                    end: e1,
                },
                Slot::Timed {
                    weekday: d2,
                    start: s2,
                    end: e2,
                },
            ) => d1 == d2 && s1 < e2 && s2 < e1,
            _ => false,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Timed {
                weekday,
                start,
                end,
            } => write!(f, "{weekday} {start}-{end}"),
            Slot::Unscheduled => f.write_str("Unscheduled"),
        }
    }
}
