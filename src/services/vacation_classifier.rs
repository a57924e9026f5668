//! Derives vacation date ranges of a fiscal year from the free-text names of
//! the imported school calendar.
//!
//! Event names carry no period tag, so classification is substring based and
//! order sensitive: summer markers are tested before winter markers, which is
//! what decides ambiguous names such as "school closure".

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::models::calendar::{ImportedEvent, VacationRanges};
use crate::models::period::CalendarPeriod;
use crate::models::timetable::Semester;
use crate::services::schedule_utils::{
    fiscal_year_end, fiscal_year_of, fiscal_year_start, try_parse_date_key,
};

const SUMMER_MARKERS: [&str; 6] = [
    "夏季休業",
    "夏休み",
    "学校閉鎖",
    "summer vacation",
    "summer break",
    "school closure",
];
const WINTER_MARKERS: [&str; 6] = [
    "冬季休業",
    "冬休み",
    "学校閉鎖",
    "winter vacation",
    "winter break",
    "school closure",
];
const SPRING_MARKERS: [&str; 2] = ["春季休業", "spring vacation"];
const YEAR_END_MARKERS: [&str; 4] = ["学年末休業", "春休み", "year-end vacation", "spring break"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VacationMatch {
    Summer,
    Winter,
    Spring,
    YearEnd,
}

fn match_name(name: &str) -> Option<VacationMatch> {
    let lowered = name.to_lowercase();
    let contains_any = |markers: &[&str]| markers.iter().any(|marker| lowered.contains(marker));

    if contains_any(&SUMMER_MARKERS) {
        Some(VacationMatch::Summer)
    } else if contains_any(&WINTER_MARKERS) {
        Some(VacationMatch::Winter)
    } else if contains_any(&SPRING_MARKERS) {
        Some(VacationMatch::Spring)
    } else if contains_any(&YEAR_END_MARKERS) {
        Some(VacationMatch::YearEnd)
    } else {
        None
    }
}

/// Scans `events` and returns the vacation ranges of `fiscal_year`.
///
/// Ranges are rebuilt on every call. Events with unparsable dates are
/// skipped. A year-end vacation always runs to March 31 once its start is
/// known, and a spring vacation seen in April always starts on April 1.
pub fn classify(fiscal_year: i32, events: &[ImportedEvent]) -> VacationRanges {
    let mut ranges = VacationRanges::default();

    for event in events {
        let date = match try_parse_date_key(&event.date) {
            Some(date) => date,
            None => {
                debug!(target: "app::vacation", date = %event.date, "skipping event with malformed date");
                continue;
            }
        };
        if fiscal_year_of(date) != fiscal_year {
            continue;
        }

        match match_name(&event.name) {
            Some(VacationMatch::Summer) => ranges.summer_vac.extend_to(date),
            Some(VacationMatch::Winter) => ranges.winter_vac.extend_to(date),
            Some(VacationMatch::Spring) => {
                if date.month() == 4 {
                    let spring = &mut ranges.spring_vac;
                    if spring.start.is_none() {
                        spring.start = Some(fiscal_year_start(fiscal_year));
                    }
                    if spring.end.map_or(true, |end| date > end) {
                        spring.end = Some(date);
                    }
                }
            }
            Some(VacationMatch::YearEnd) => {
                let year_end = &mut ranges.end_year_vac;
                if year_end.start.map_or(true, |start| date < start) {
                    year_end.start = Some(date);
                }
                year_end.end = Some(fiscal_year_end(fiscal_year));
            }
            None => {}
        }
    }

    debug!(
        target: "app::vacation",
        fiscal_year,
        spring = ranges.spring_vac.is_known(),
        summer = ranges.summer_vac.is_known(),
        winter = ranges.winter_vac.is_known(),
        year_end = ranges.end_year_vac.is_known(),
        "vacation ranges classified"
    );

    ranges
}

/// Calendar period of `date` given the ranges of its fiscal year; dates in
/// no vacation fall back to the term weekdays of their month.
pub fn period_for_date(date: NaiveDate, ranges: &VacationRanges) -> CalendarPeriod {
    ranges
        .vacation_for(date)
        .unwrap_or_else(|| match Semester::for_month(date.month()) {
            Semester::First => CalendarPeriod::FirstSemester,
            Semester::Second => CalendarPeriod::SecondSemester,
        })
}

/// Classifies `date` against freshly derived ranges of its own fiscal year.
pub fn classify_date(date: NaiveDate, events: &[ImportedEvent]) -> CalendarPeriod {
    let ranges = classify(fiscal_year_of(date), events);
    period_for_date(date, &ranges)
}
