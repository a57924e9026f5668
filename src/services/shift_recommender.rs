use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::models::period::CalendarPeriod;
use crate::models::settings::PlannerConfig;
use crate::models::shift::{ShiftId, RELAXED_SHIFT, SHIFT_CATALOG};
use crate::models::timetable::{ClassEntry, ClassPeriod, PeriodSpan, Semester};
use crate::models::work_settings::{FIRST_WEEKDAY, LAST_WEEKDAY};
use crate::services::work_settings_store::WorkSettingsStore;

/// Latest-starting shift that still lets the staff member arrive
/// `arrival_buffer_minutes` before the first occupied period and stay until
/// the last one ends.
///
/// Falls back to the latest shift that at least starts in time, then to the
/// custom sentinel. Days without any known period get the relaxed shift.
pub fn recommend(occupied: &BTreeSet<ClassPeriod>, config: &PlannerConfig) -> ShiftId {
    let intervals: Vec<_> = occupied
        .iter()
        .filter_map(|period| config.period_times.get(*period))
        .collect();

    let (Some(first_start), Some(last_end)) = (
        intervals.iter().map(|interval| interval.start_minutes()).min(),
        intervals.iter().map(|interval| interval.end_minutes()).max(),
    ) else {
        return RELAXED_SHIFT;
    };

    let needed_start = i64::from(first_start) - config.arrival_buffer_minutes;
    let needed_end = i64::from(last_end);

    let latest_first = || {
        SHIFT_CATALOG
            .iter()
            .rev()
            .filter_map(|pattern| pattern.interval().map(|interval| (pattern.id, interval)))
    };

    let best_fit = latest_first()
        .find(|(_, interval)| interval.covers(needed_start, needed_end))
        .map(|(id, _)| id);
    let start_fit = || {
        latest_first()
            .find(|(_, interval)| i64::from(interval.start_minutes()) <= needed_start)
            .map(|(id, _)| id)
    };

    best_fit.or_else(start_fit).unwrap_or(ShiftId::Other)
}

/// Class periods taught on `weekday` (1 = Monday) during `period` of
/// `fiscal_year`. Vacations have no classes.
pub fn occupied_periods(
    classes: &[ClassEntry],
    period: CalendarPeriod,
    weekday: u8,
    fiscal_year: i32,
) -> BTreeSet<ClassPeriod> {
    let semester = match period {
        CalendarPeriod::SpringVacation | CalendarPeriod::FirstSemester => Semester::First,
        CalendarPeriod::SecondSemester => Semester::Second,
        _ => return BTreeSet::new(),
    };

    classes
        .iter()
        .filter(|class| class.runs_in_year(fiscal_year))
        .filter_map(|class| class.slot_for(semester))
        .filter(|slot| slot.weekday == weekday)
        .filter_map(|slot| PeriodSpan::parse(&slot.period))
        .flat_map(|span| span.periods().collect::<Vec<_>>())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecommendation {
    pub period: CalendarPeriod,
    pub weekday: u8,
    pub occupied: Vec<ClassPeriod>,
    pub recommended: ShiftId,
    pub configured: ShiftId,
}

impl PeriodRecommendation {
    pub fn matches(&self) -> bool {
        self.recommended == self.configured
    }
}

/// Recommendation for every period and weekday of a fiscal year, next to
/// the shift currently configured for that slot.
pub fn recommend_for_year(
    store: &WorkSettingsStore,
    classes: &[ClassEntry],
    fiscal_year: i32,
    config: &PlannerConfig,
) -> Vec<PeriodRecommendation> {
    let mut grid = Vec::with_capacity(CalendarPeriod::ALL.len() * 5);
    for period in CalendarPeriod::ALL {
        for weekday in FIRST_WEEKDAY..=LAST_WEEKDAY {
            let occupied = occupied_periods(classes, period, weekday, fiscal_year);
            let recommended = recommend(&occupied, config);
            let configured = store
                .day_setting(fiscal_year, period, weekday)
                .map(|setting| setting.shift)
                .unwrap_or_else(|| period.default_shift());
            grid.push(PeriodRecommendation {
                period,
                weekday,
                occupied: occupied.into_iter().collect(),
                recommended,
                configured,
            });
        }
    }

    debug!(
        target: "app::recommend",
        fiscal_year,
        mismatches = grid.iter().filter(|cell| !cell.matches()).count(),
        "year recommendations computed"
    );
    grid
}
