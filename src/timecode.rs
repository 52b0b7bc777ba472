//! Compact schedule-code decoding.
//!
//! University timetables encode a weekly schedule as `[days][shift][periods]`,
//! e.g. `"24T34"` = Monday and Wednesday, afternoon shift, periods 3 and 4.
//! Several elementary codes may be joined with whitespace to describe a
//! composite schedule: `"236T1234 4T56"`.
//!
//! # Components
//! - **days**: digits `2..=7` (Monday..Saturday)
//! - **shift**: `M` (morning), `T` (afternoon), `N` (evening)
//! - **periods**: digits `1..=6`, looked up in a shift-specific clock table
//!
//! # Slot policy
//! [`decode`] emits one atomic [`Slot`] per (weekday, period) pair, so a code
//! with a gap (`"2M13"`) never claims the free period in between. Contiguous
//! runs are merged only for display ([`ElementaryCode::ranges`], [`describe`]).
//!
//! # Failure policy
//! Decoding never fails: a code with any malformed elementary part decodes
//! to `{Slot::Unscheduled}`. Use [`TimeCode::parse`] to get the reason.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ClockTime, Slot, Weekday};

/// Teaching shift selected by the code letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
}

/// Number of periods per shift.
pub const PERIODS_PER_SHIFT: u8 = 6;

// (start, end) in minutes since midnight, indexed by period - 1.
const MORNING_TABLE: [(u16, u16); 6] = [
    (420, 470), // 07:00-07:50
    (480, 530), // 08:00-08:50
    (540, 590), // 09:00-09:50
    (600, 650), // 10:00-10:50
    (660, 710), // 11:00-11:50
    (720, 770), // 12:00-12:50
];

const AFTERNOON_TABLE: [(u16, u16); 6] = [
    (780, 830),  // 13:00-13:50
    (830, 880),  // 13:50-14:40
    (880, 930),  // 14:40-15:30
    (930, 980),  // 15:30-16:20
    (980, 1030), // 16:20-17:10
    (1030, 1080), // 17:10-18:00
];

const EVENING_TABLE: [(u16, u16); 6] = [
    (1080, 1130), // 18:00-18:50
    (1130, 1180), // 18:50-19:40
    (1180, 1230), // 19:40-20:30
    (1230, 1280), // 20:30-21:20
    (1280, 1330), // 21:20-22:10
    (1330, 1380), // 22:10-23:00
];

impl Shift {
    /// Maps a code letter to a shift.
    pub fn from_code_letter(letter: char) -> Option<Self> {
        match letter {
            'M' => Some(Shift::Morning),
            'T' => Some(Shift::Afternoon),
            'N' => Some(Shift::Evening),
            _ => None,
        }
    }

    /// Code letter of this shift.
    pub fn code_letter(&self) -> char {
        match self {
            Shift::Morning => 'M',
            Shift::Afternoon => 'T',
            Shift::Evening => 'N',
        }
    }

    /// Clock interval of a period (1-based).
    ///
    /// Returns `None` for periods outside `1..=6`.
    pub fn period_bounds(&self, period: u8) -> Option<(ClockTime, ClockTime)> {
        if period == 0 || period > PERIODS_PER_SHIFT {
            return None;
        }
        let table = match self {
            Shift::Morning => &MORNING_TABLE,
            Shift::Afternoon => &AFTERNOON_TABLE,
            Shift::Evening => &EVENING_TABLE,
        };
        let (start, end) = table[usize::from(period - 1)];
        Some((ClockTime::at(start), ClockTime::at(end)))
    }
}

/// Why a schedule code could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeCodeError {
    #[error("schedule code is empty")]
    Empty,
    #[error("malformed schedule code '{code}': expected [days][M|T|N][periods]")]
    Malformed { code: String },
    #[error("invalid weekday digit '{digit}' in schedule code '{code}'")]
    InvalidWeekday { code: String, digit: char },
    #[error("invalid period digit '{digit}' in schedule code '{code}'")]
    InvalidPeriod { code: String, digit: char },
}

/// One `[days][shift][periods]` unit of a schedule code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementaryCode {
    pub weekdays: BTreeSet<Weekday>,
    pub shift: Shift,
    pub periods: BTreeSet<u8>,
}

impl ElementaryCode {
    /// Parses a single elementary code such as `"35M12"`.
    pub fn parse(code: &str) -> Result<Self, TimeCodeError> {
        let malformed = || TimeCodeError::Malformed {
            code: code.to_string(),
        };

        let shift_pos = code
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .ok_or_else(malformed)?;
        let (day_part, rest) = code.split_at(shift_pos);
        let mut rest_chars = rest.chars();
        let shift = rest_chars
            .next()
            .and_then(Shift::from_code_letter)
            .ok_or_else(malformed)?;
        let period_part = rest_chars.as_str();

        if day_part.is_empty() || period_part.is_empty() {
            return Err(malformed());
        }

        let mut weekdays = BTreeSet::new();
        for digit in day_part.chars() {
            let day = Weekday::from_code_digit(digit).ok_or_else(|| {
                TimeCodeError::InvalidWeekday {
                    code: code.to_string(),
                    digit,
                }
            })?;
            weekdays.insert(day);
        }

        let mut periods = BTreeSet::new();
        for digit in period_part.chars() {
            let period = digit
                .to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .filter(|p| (1..=PERIODS_PER_SHIFT).contains(p))
                .ok_or_else(|| {
                    if digit.is_ascii_digit() {
                        TimeCodeError::InvalidPeriod {
                            code: code.to_string(),
                            digit,
                        }
                    } else {
                        malformed()
                    }
                })?;
            periods.insert(period);
        }

        Ok(Self {
            weekdays,
            shift,
            periods,
        })
    }

    /// Atomic slots: weekdays × periods.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.weekdays.iter().flat_map(move |&day| {
            self.periods.iter().filter_map(move |&p| {
                self.shift
                    .period_bounds(p)
                    .map(|(start, end)| Slot::timed(day, start, end))
            })
        })
    }

    /// Display ranges: consecutive periods merged per weekday, gaps kept.
    ///
    /// `2M13` yields two ranges (`07:00-07:50`, `09:00-09:50`), never one
    /// range covering the free second period.
    pub fn ranges(&self) -> Vec<Slot> {
        let mut runs: Vec<(u8, u8)> = Vec::new();
        for &p in &self.periods {
            match runs.last_mut() {
                Some((_, last)) if *last + 1 == p => *last = p,
                _ => runs.push((p, p)),
            }
        }

        let mut ranges = Vec::new();
        for &day in &self.weekdays {
            for &(first, last) in &runs {
                if let (Some((start, _)), Some((_, end))) = (
                    self.shift.period_bounds(first),
                    self.shift.period_bounds(last),
                ) {
                    ranges.push(Slot::timed(day, start, end));
                }
            }
        }
        ranges
    }
}

impl fmt::Display for ElementaryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in &self.weekdays {
            let digit = Weekday::ALL.iter().position(|d| d == day).unwrap_or(0) + 2;
            write!(f, "{digit}")?;
        }
        write!(f, "{}", self.shift.code_letter())?;
        for p in &self.periods {
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

/// A full, possibly composite, schedule code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCode {
    pub parts: Vec<ElementaryCode>,
}

impl TimeCode {
    /// Parses a whitespace-separated composite code.
    pub fn parse(code: &str) -> Result<Self, TimeCodeError> {
        let parts = code
            .split_whitespace()
            .map(ElementaryCode::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if parts.is_empty() {
            return Err(TimeCodeError::Empty);
        }
        Ok(Self { parts })
    }

    /// Deduplicated atomic slots of every part.
    pub fn slots(&self) -> BTreeSet<Slot> {
        self.parts.iter().flat_map(|p| p.slots()).collect()
    }
}

/// Decodes a schedule code into its set of atomic slots.
///
/// Never fails: unrecognized codes yield `{Slot::Unscheduled}`.
///
/// # Example
/// ```
/// use u_roomalloc::timecode::decode;
///
/// let slots = decode("2M12");
/// let text: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
/// assert_eq!(text, vec!["Mon 07:00-07:50", "Mon 08:00-08:50"]);
/// ```
pub fn decode(code: &str) -> BTreeSet<Slot> {
    match TimeCode::parse(code) {
        Ok(parsed) => parsed.slots(),
        Err(err) => {
            log::warn!("{err}; treating as unscheduled");
            BTreeSet::from([Slot::Unscheduled])
        }
    }
}

/// Human-readable schedule, e.g. `"Mon 07:00-08:50; Wed 07:00-08:50"`.
///
/// Unrecognized codes render as `"Unscheduled"`.
pub fn describe(code: &str) -> String {
    match TimeCode::parse(code) {
        Ok(parsed) => {
            let mut ranges: Vec<Slot> = parsed.parts.iter().flat_map(|p| p.ranges()).collect();
            ranges.sort();
            ranges.dedup();
            ranges
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        }
        Err(_) => Slot::Unscheduled.to_string(),
    }
}
