//! Finds what a proposed time window collides with.
//!
//! For every date of the candidate range three sources are checked in a
//! fixed order: imported calendar events, timetable classes and registered
//! commitments. Two windows conflict only when they strictly overlap.
//! Results are advisory descriptions; nothing here blocks a write.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::models::calendar::{ImportedEvent, VacationRanges};
use crate::models::commitment::{CommitmentItem, CommitmentKind};
use crate::models::conflict::ConflictCandidate;
use crate::models::period::CalendarPeriod;
use crate::models::time::TimeInterval;
use crate::models::timetable::{ClassEntry, PeriodSpan, PeriodTimeTable, Semester};
use crate::services::commitment_service::leave_window;
use crate::services::schedule_utils::{
    dates_between, fiscal_year_of, format_date_key, interval_from_bounds, try_parse_date_key,
};
use crate::services::vacation_classifier;
use crate::services::work_time_resolver::WorkTimeResolver;

pub struct ConflictDetector<'a> {
    resolver: WorkTimeResolver<'a>,
    events: &'a [ImportedEvent],
    events_by_date: BTreeMap<NaiveDate, Vec<&'a ImportedEvent>>,
    classes: &'a [ClassEntry],
    commitments: &'a [CommitmentItem],
    period_times: &'a PeriodTimeTable,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(
        resolver: WorkTimeResolver<'a>,
        events: &'a [ImportedEvent],
        classes: &'a [ClassEntry],
        commitments: &'a [CommitmentItem],
        period_times: &'a PeriodTimeTable,
    ) -> Self {
        let mut events_by_date: BTreeMap<NaiveDate, Vec<&'a ImportedEvent>> = BTreeMap::new();
        for event in events.iter().filter(|event| !event.name.trim().is_empty()) {
            if let Some(date) = try_parse_date_key(&event.date) {
                events_by_date.entry(date).or_default().push(event);
            }
        }

        Self {
            resolver,
            events,
            events_by_date,
            classes,
            commitments,
            period_times,
        }
    }

    /// Conflicts of an ad-hoc window. Each date is checked against the
    /// candidate's time window on that date; trip-like candidates only bound
    /// their first and last day.
    pub fn find_conflicts(&self, candidate: &ConflictCandidate) -> Vec<String> {
        let start = candidate.start_time.as_deref();
        let end = candidate.end_time.as_deref();
        self.scan(
            candidate.start_date,
            candidate.end_date,
            candidate.exclude_id.as_deref(),
            |date| {
                if candidate.trip_like {
                    trip_window(date, candidate.start_date, candidate.end_date, start, end)
                } else {
                    interval_from_bounds(start, end)
                }
            },
        )
    }

    /// Conflicts of an already registered commitment with everything else.
    pub fn find_conflicts_for(&self, item: &CommitmentItem) -> Vec<String> {
        self.scan(item.start_date, item.end_date, Some(&item.id), |date| {
            self.commitment_window(item, date)
        })
    }

    fn scan<F>(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_id: Option<&str>,
        window_on: F,
    ) -> Vec<String>
    where
        F: Fn(NaiveDate) -> Option<TimeInterval>,
    {
        if end_date < start_date {
            warn!(
                target: "app::conflict",
                start = %format_date_key(start_date),
                end = %format_date_key(end_date),
                "candidate range runs backwards"
            );
            return Vec::new();
        }

        let mut ranges: HashMap<i32, VacationRanges> = HashMap::new();
        let mut seen = HashSet::new();
        let mut conflicts = Vec::new();

        for date in dates_between(start_date, end_date) {
            let Some(window) = window_on(date) else {
                debug!(target: "app::conflict", date = %format_date_key(date), "no window on date");
                continue;
            };

            let fiscal_year = fiscal_year_of(date);
            let ranges = ranges
                .entry(fiscal_year)
                .or_insert_with(|| vacation_classifier::classify(fiscal_year, self.events));
            let period = vacation_classifier::period_for_date(date, ranges);

            let found = self
                .event_conflicts(date, &window)
                .chain(self.class_conflicts(date, period, &window))
                .chain(self.commitment_conflicts(date, exclude_id, &window));
            for description in found {
                if seen.insert(description.clone()) {
                    conflicts.push(description);
                }
            }
        }

        debug!(
            target: "app::conflict",
            start = %format_date_key(start_date),
            end = %format_date_key(end_date),
            count = conflicts.len(),
            "conflict scan finished"
        );
        conflicts
    }

    fn event_conflicts<'s>(
        &'s self,
        date: NaiveDate,
        window: &'s TimeInterval,
    ) -> impl Iterator<Item = String> + 's {
        self.events_by_date
            .get(&date)
            .into_iter()
            .flatten()
            .filter(move |event| {
                interval_from_bounds(event.start_time.as_deref(), event.end_time.as_deref())
                    .map_or(false, |interval| interval.overlaps(window))
            })
            .map(move |event| format!("{}: {}", format_date_key(date), event.name.trim()))
    }

    /// Classes only meet on term weekdays.
    fn class_conflicts<'s>(
        &'s self,
        date: NaiveDate,
        period: CalendarPeriod,
        window: &'s TimeInterval,
    ) -> impl Iterator<Item = String> + 's {
        let semester = match period {
            CalendarPeriod::FirstSemester => Some(Semester::First),
            CalendarPeriod::SecondSemester => Some(Semester::Second),
            _ => None,
        };
        let fiscal_year = fiscal_year_of(date);
        let weekday = date.weekday().num_days_from_sunday() as u8;

        self.classes
            .iter()
            .filter(move |class| class.runs_in_year(fiscal_year))
            .filter_map(move |class| {
                let slot = class.slot_for(semester?)?;
                if slot.weekday != weekday {
                    return None;
                }
                let span = PeriodSpan::parse(&slot.period)?;
                let interval = self.period_times.span_interval(&span)?;
                interval.overlaps(window).then(|| {
                    format!(
                        "{}: class {} (period {})",
                        format_date_key(date),
                        class.name,
                        span.label()
                    )
                })
            })
    }

    fn commitment_conflicts<'s>(
        &'s self,
        date: NaiveDate,
        exclude_id: Option<&'s str>,
        window: &'s TimeInterval,
    ) -> impl Iterator<Item = String> + 's {
        self.commitments
            .iter()
            .filter(move |item| exclude_id != Some(item.id.as_str()))
            .filter(move |item| item.covers(date))
            .filter_map(move |item| {
                let interval = self.commitment_window(item, date)?;
                interval.overlaps(window).then(|| {
                    format!(
                        "{}: {} {} ({})",
                        format_date_key(date),
                        item.kind.label(),
                        item.title,
                        interval
                    )
                })
            })
    }

    /// Time an existing commitment occupies on `date`, or `None` when it
    /// occupies nothing that day.
    fn commitment_window(&self, item: &CommitmentItem, date: NaiveDate) -> Option<TimeInterval> {
        match &item.kind {
            CommitmentKind::Trip {
                departure_time,
                arrival_time,
                ..
            } => trip_window(
                date,
                item.start_date,
                item.end_date,
                departure_time.as_deref(),
                arrival_time.as_deref(),
            ),
            CommitmentKind::Leave {
                leave_type,
                hours,
                extra_minutes,
            } => {
                let work = self.resolver.resolve(date, false)?;
                Some(leave_window(work.interval, *leave_type, *hours, *extra_minutes))
            }
            CommitmentKind::WorkFromHome {
                start_time,
                end_time,
                ..
            } => {
                if start_time.is_none() && end_time.is_none() {
                    Some(
                        self.resolver
                            .resolve(date, false)
                            .map(|work| work.interval)
                            .unwrap_or_else(TimeInterval::full_day),
                    )
                } else {
                    interval_from_bounds(start_time.as_deref(), end_time.as_deref())
                }
            }
            CommitmentKind::HolidayWork {
                start_time,
                end_time,
            } => interval_from_bounds(start_time.as_deref(), end_time.as_deref()),
            CommitmentKind::Event {
                start_time,
                end_time,
                all_day,
            } => {
                if *all_day {
                    Some(TimeInterval::full_day())
                } else {
                    interval_from_bounds(start_time.as_deref(), end_time.as_deref())
                }
            }
        }
    }
}

/// Departure bounds the first day and arrival the last; days in between are
/// fully occupied.
fn trip_window(
    date: NaiveDate,
    start_date: NaiveDate,
    end_date: NaiveDate,
    departure: Option<&str>,
    arrival: Option<&str>,
) -> Option<TimeInterval> {
    let start = if date == start_date { departure } else { None };
    let end = if date == end_date { arrival } else { None };
    interval_from_bounds(start, end)
}
