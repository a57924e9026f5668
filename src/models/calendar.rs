use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::period::CalendarPeriod;

/// One entry of the uploaded school calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportedEvent {
    /// `YYYY-MM-DD` or `YYYY/MM/DD`.
    pub date: String,
    #[serde(default, alias = "event")]
    pub name: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl ImportedEvent {
    pub fn new(date: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            name: name.into(),
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self
    }
}

/// Inclusive date range of a vacation period; both ends stay `None` until a
/// matching event is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl VacationRange {
    pub fn is_known(&self) -> bool {
        self.start.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => date >= start && date <= end,
            _ => false,
        }
    }

    pub(crate) fn extend_to(&mut self, date: NaiveDate) {
        if self.start.map_or(true, |start| date < start) {
            self.start = Some(date);
        }
        if self.end.map_or(true, |end| date > end) {
            self.end = Some(date);
        }
    }
}

/// Vacation ranges of one fiscal year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationRanges {
    pub spring_vac: VacationRange,
    pub summer_vac: VacationRange,
    pub winter_vac: VacationRange,
    pub end_year_vac: VacationRange,
}

impl VacationRanges {
    /// Vacation containing `date`, checked spring, summer, winter, year-end.
    pub fn vacation_for(&self, date: NaiveDate) -> Option<CalendarPeriod> {
        [
            (CalendarPeriod::SpringVacation, &self.spring_vac),
            (CalendarPeriod::SummerVacation, &self.summer_vac),
            (CalendarPeriod::WinterVacation, &self.winter_vac),
            (CalendarPeriod::EndYearVacation, &self.end_year_vac),
        ]
        .into_iter()
        .find(|(_, range)| range.contains(date))
        .map(|(period, _)| period)
    }
}
