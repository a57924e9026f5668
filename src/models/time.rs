use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wall-clock span on a single date, `start` inclusive and `end` exclusive
/// for overlap purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeInterval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn from_minutes(start: u32, end: u32) -> Self {
        Self {
            start: clock_from_minutes(start),
            end: clock_from_minutes(end),
        }
    }

    /// `00:00–23:59`, used for items without explicit hours.
    pub fn full_day() -> Self {
        Self::from_minutes(0, 23 * 60 + 59)
    }

    pub fn start_minutes(&self) -> u32 {
        self.start.hour() * 60 + self.start.minute()
    }

    pub fn end_minutes(&self) -> u32 {
        self.end.hour() * 60 + self.end.minute()
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Strict overlap: intervals that only touch do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn covers(&self, start_minute: i64, end_minute: i64) -> bool {
        i64::from(self.start_minutes()) <= start_minute && i64::from(self.end_minutes()) >= end_minute
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

#[derive(Serialize, Deserialize)]
struct TimeIntervalRepr {
    start: String,
    end: String,
}

impl Serialize for TimeInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TimeIntervalRepr {
            start: self.start.format("%H:%M").to_string(),
            end: self.end.format("%H:%M").to_string(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TimeInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = TimeIntervalRepr::deserialize(deserializer)?;
        let start = NaiveTime::parse_from_str(repr.start.trim(), "%H:%M")
            .map_err(serde::de::Error::custom)?;
        let end = NaiveTime::parse_from_str(repr.end.trim(), "%H:%M")
            .map_err(serde::de::Error::custom)?;
        Ok(Self { start, end })
    }
}

pub(crate) fn clock_from_minutes(total_minutes: u32) -> NaiveTime {
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    NaiveTime::from_hms_opt(hours, minutes, 0)
        .unwrap_or(NaiveTime::MIN)
}
