use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::period::CalendarPeriod;
use crate::models::shift::ShiftId;
use crate::models::time::TimeInterval;

/// Weekday number (1 = Monday ... 5 = Friday) to configured shift.
pub type WeekdaySettings = BTreeMap<u8, DaySetting>;

pub const FIRST_WEEKDAY: u8 = 1;
pub const LAST_WEEKDAY: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DaySetting {
    pub shift: ShiftId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl DaySetting {
    pub fn shift(shift: ShiftId) -> Self {
        Self {
            shift,
            start: None,
            end: None,
        }
    }
}

/// Per-period weekday templates of one fiscal year.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FiscalYearSettings {
    #[serde(default)]
    pub spring_vac: WeekdaySettings,
    #[serde(default)]
    pub first_semester: WeekdaySettings,
    #[serde(default)]
    pub summer_vac: WeekdaySettings,
    #[serde(default)]
    pub second_semester: WeekdaySettings,
    #[serde(default)]
    pub winter_vac: WeekdaySettings,
    #[serde(default)]
    pub end_year_vac: WeekdaySettings,
}

impl FiscalYearSettings {
    pub fn period(&self, period: CalendarPeriod) -> &WeekdaySettings {
        match period {
            CalendarPeriod::SpringVacation => &self.spring_vac,
            CalendarPeriod::FirstSemester => &self.first_semester,
            CalendarPeriod::SummerVacation => &self.summer_vac,
            CalendarPeriod::SecondSemester => &self.second_semester,
            CalendarPeriod::WinterVacation => &self.winter_vac,
            CalendarPeriod::EndYearVacation => &self.end_year_vac,
        }
    }

    pub fn period_mut(&mut self, period: CalendarPeriod) -> &mut WeekdaySettings {
        match period {
            CalendarPeriod::SpringVacation => &mut self.spring_vac,
            CalendarPeriod::FirstSemester => &mut self.first_semester,
            CalendarPeriod::SummerVacation => &mut self.summer_vac,
            CalendarPeriod::SecondSemester => &mut self.second_semester,
            CalendarPeriod::WinterVacation => &mut self.winter_vac,
            CalendarPeriod::EndYearVacation => &mut self.end_year_vac,
        }
    }

    pub fn day(&self, period: CalendarPeriod, weekday: u8) -> Option<&DaySetting> {
        self.period(period).get(&weekday)
    }

    /// Fills every missing period/weekday slot with the period default.
    /// Returns the number of slots that were added.
    pub fn fill_defaults(&mut self) -> usize {
        let mut added = 0;
        for period in CalendarPeriod::ALL {
            let default_shift = period.default_shift();
            let slots = self.period_mut(period);
            for weekday in FIRST_WEEKDAY..=LAST_WEEKDAY {
                if !slots.contains_key(&weekday) {
                    slots.insert(weekday, DaySetting::shift(default_shift));
                    added += 1;
                }
            }
        }
        added
    }
}

/// Per-date exception that supersedes the period template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateOverride {
    pub shift: ShiftId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Submitted for approval.
    #[serde(default)]
    pub applied: bool,
}

pub type DateOverrides = BTreeMap<NaiveDate, DateOverride>;

/// Which resolution layer produced a work time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkTimeSource {
    Override,
    PeriodTemplate,
    Fallback,
}

/// Effective working hours of one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTime {
    #[serde(flatten)]
    pub interval: TimeInterval,
    pub shift: ShiftId,
    pub name: String,
    pub source: WorkTimeSource,
    /// Calendar period the date was classified into; `None` for overrides,
    /// which short-circuit classification.
    pub period: Option<CalendarPeriod>,
    pub applied: bool,
}

impl WorkTime {
    pub fn is_override(&self) -> bool {
        self.source == WorkTimeSource::Override
    }
}
