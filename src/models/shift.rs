use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::time::TimeInterval;

/// Named shift patterns. `Other` is the custom sentinel whose hours come
/// from the owning setting or override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftId {
    A,
    B,
    C,
    D,
    E,
    Other,
}

/// Shift used for vacation periods and for days without classes.
pub const RELAXED_SHIFT: ShiftId = ShiftId::C;
/// Shift used for term weekdays.
pub const STANDARD_SHIFT: ShiftId = ShiftId::B;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftPattern {
    pub id: ShiftId,
    pub name: &'static str,
    /// Start/end minute of day; `None` for the custom sentinel.
    hours: Option<(u32, u32)>,
}

impl ShiftPattern {
    pub fn interval(&self) -> Option<TimeInterval> {
        self.hours
            .map(|(start, end)| TimeInterval::from_minutes(start, end))
    }
}

/// Catalog ordered from the earliest-starting to the latest-starting shift,
/// with the custom sentinel last.
pub const SHIFT_CATALOG: [ShiftPattern; 6] = [
    ShiftPattern {
        id: ShiftId::A,
        name: "A shift",
        hours: Some((8 * 60, 16 * 60 + 30)),
    },
    ShiftPattern {
        id: ShiftId::B,
        name: "B shift",
        hours: Some((8 * 60 + 45, 17 * 60 + 15)),
    },
    ShiftPattern {
        id: ShiftId::C,
        name: "C shift",
        hours: Some((9 * 60 + 30, 18 * 60)),
    },
    ShiftPattern {
        id: ShiftId::D,
        name: "D shift",
        hours: Some((10 * 60 + 30, 19 * 60)),
    },
    ShiftPattern {
        id: ShiftId::E,
        name: "E shift",
        hours: Some((11 * 60 + 30, 20 * 60)),
    },
    ShiftPattern {
        id: ShiftId::Other,
        name: "Other",
        hours: None,
    },
];

impl ShiftId {
    pub const ALL: [ShiftId; 6] = [
        ShiftId::A,
        ShiftId::B,
        ShiftId::C,
        ShiftId::D,
        ShiftId::E,
        ShiftId::Other,
    ];

    pub fn pattern(self) -> &'static ShiftPattern {
        let index = match self {
            ShiftId::A => 0,
            ShiftId::B => 1,
            ShiftId::C => 2,
            ShiftId::D => 3,
            ShiftId::E => 4,
            ShiftId::Other => 5,
        };
        &SHIFT_CATALOG[index]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShiftId::A => "A",
            ShiftId::B => "B",
            ShiftId::C => "C",
            ShiftId::D => "D",
            ShiftId::E => "E",
            ShiftId::Other => "Other",
        }
    }

    pub fn is_custom(self) -> bool {
        matches!(self, ShiftId::Other)
    }

    /// Fixed hours of the pattern, `None` for the custom sentinel.
    pub fn interval(self) -> Option<TimeInterval> {
        self.pattern().interval()
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
