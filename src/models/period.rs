use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::shift::{ShiftId, RELAXED_SHIFT, STANDARD_SHIFT};

/// The six segments of the school year that select a default shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarPeriod {
    #[serde(rename = "spring_vac")]
    SpringVacation,
    FirstSemester,
    #[serde(rename = "summer_vac")]
    SummerVacation,
    SecondSemester,
    #[serde(rename = "winter_vac")]
    WinterVacation,
    #[serde(rename = "end_year_vac")]
    EndYearVacation,
}

/// Display metadata consumed by the configuration UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub bg_color: &'static str,
}

impl CalendarPeriod {
    /// School-year progression order.
    pub const ALL: [CalendarPeriod; 6] = [
        CalendarPeriod::SpringVacation,
        CalendarPeriod::FirstSemester,
        CalendarPeriod::SummerVacation,
        CalendarPeriod::SecondSemester,
        CalendarPeriod::WinterVacation,
        CalendarPeriod::EndYearVacation,
    ];

    pub fn id(self) -> &'static str {
        self.metadata().id
    }

    pub fn is_vacation(self) -> bool {
        !matches!(
            self,
            CalendarPeriod::FirstSemester | CalendarPeriod::SecondSemester
        )
    }

    /// Shift used when a year has no stored setting for this period.
    pub fn default_shift(self) -> ShiftId {
        if self.is_vacation() {
            RELAXED_SHIFT
        } else {
            STANDARD_SHIFT
        }
    }

    pub fn metadata(self) -> PeriodMetadata {
        match self {
            CalendarPeriod::SpringVacation => PeriodMetadata {
                id: "spring_vac",
                name: "Spring vacation (from April 1)",
                icon: "🌸",
                color: "#db2777",
                bg_color: "#fdf2f8",
            },
            CalendarPeriod::FirstSemester => PeriodMetadata {
                id: "first_semester",
                name: "First-term weekdays (April-September)",
                icon: "🌱",
                color: "#000000",
                bg_color: "#ffffff",
            },
            CalendarPeriod::SummerVacation => PeriodMetadata {
                id: "summer_vac",
                name: "Summer vacation",
                icon: "☀️",
                color: "#ea580c",
                bg_color: "#fff7ed",
            },
            CalendarPeriod::SecondSemester => PeriodMetadata {
                id: "second_semester",
                name: "Second-term weekdays (October-March)",
                icon: "🍂",
                color: "#000000",
                bg_color: "#ffffff",
            },
            CalendarPeriod::WinterVacation => PeriodMetadata {
                id: "winter_vac",
                name: "Winter vacation",
                icon: "❄️",
                color: "#2563eb",
                bg_color: "#eff6ff",
            },
            CalendarPeriod::EndYearVacation => PeriodMetadata {
                id: "end_year_vac",
                name: "Year-end vacation (until March 31)",
                icon: "🌸",
                color: "#7c3aed",
                bg_color: "#f5f3ff",
            },
        }
    }
}

impl fmt::Display for CalendarPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
