//! Effective working hours of a date.
//!
//! Resolution runs an ordered chain of layers. Each layer either settles the
//! answer (hours or "no work") or passes to the next one:
//!
//! 1. weekends never have working hours, overrides included;
//! 2. a per-date override, unless the caller asks to ignore it;
//! 3. the fiscal-year template of the date's calendar period and weekday;
//! 4. the period default shift when the year has no stored setting.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::unsync::OnceCell;
use tracing::debug;

use crate::error::AppResult;
use crate::models::calendar::ImportedEvent;
use crate::models::period::CalendarPeriod;
use crate::models::settings::PlannerConfig;
use crate::models::shift::ShiftId;
use crate::models::time::TimeInterval;
use crate::models::work_settings::{
    DateOverride, DateOverrides, FiscalYearSettings, WorkTime, WorkTimeSource,
};
use crate::services::schedule_utils::{
    fiscal_year_of, format_date_key, interval_or, is_weekend, weekday_number,
};
use crate::services::vacation_classifier;
use crate::services::work_settings_store::{PersistSignal, WorkSettingsStore};

/// One resolution request. The calendar period is derived at most once and
/// only when a layer asks for it.
pub struct WorkTimeQuery<'a> {
    pub date: NaiveDate,
    pub weekday: u8,
    pub fiscal_year: i32,
    pub ignore_override: bool,
    events: &'a [ImportedEvent],
    period: OnceCell<CalendarPeriod>,
}

impl<'a> WorkTimeQuery<'a> {
    pub fn new(date: NaiveDate, ignore_override: bool, events: &'a [ImportedEvent]) -> Self {
        Self {
            date,
            weekday: weekday_number(date),
            fiscal_year: fiscal_year_of(date),
            ignore_override,
            events,
            period: OnceCell::new(),
        }
    }

    pub fn period(&self) -> CalendarPeriod {
        *self
            .period
            .get_or_init(|| vacation_classifier::classify_date(self.date, self.events))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerOutcome {
    Resolved(WorkTime),
    NonWorking,
    Pass,
}

pub trait WorkTimeLayer {
    fn name(&self) -> &'static str;
    fn resolve(&self, query: &WorkTimeQuery<'_>) -> LayerOutcome;
}

pub struct WeekendLayer;

impl WorkTimeLayer for WeekendLayer {
    fn name(&self) -> &'static str {
        "weekend"
    }

    fn resolve(&self, query: &WorkTimeQuery<'_>) -> LayerOutcome {
        if is_weekend(query.date) {
            LayerOutcome::NonWorking
        } else {
            LayerOutcome::Pass
        }
    }
}

pub struct OverrideLayer<'a> {
    overrides: &'a DateOverrides,
    custom_fallback: TimeInterval,
}

impl<'a> OverrideLayer<'a> {
    pub fn new(overrides: &'a DateOverrides, custom_fallback: TimeInterval) -> Self {
        Self {
            overrides,
            custom_fallback,
        }
    }
}

impl WorkTimeLayer for OverrideLayer<'_> {
    fn name(&self) -> &'static str {
        "override"
    }

    fn resolve(&self, query: &WorkTimeQuery<'_>) -> LayerOutcome {
        if query.ignore_override {
            return LayerOutcome::Pass;
        }
        let Some(date_override) = self.overrides.get(&query.date) else {
            return LayerOutcome::Pass;
        };

        let interval = shift_hours(
            date_override.shift,
            date_override.start.as_deref(),
            date_override.end.as_deref(),
            self.custom_fallback,
        );
        LayerOutcome::Resolved(WorkTime {
            interval,
            shift: date_override.shift,
            name: date_override.shift.pattern().name.to_string(),
            source: WorkTimeSource::Override,
            period: None,
            applied: date_override.applied,
        })
    }
}

pub struct PeriodTemplateLayer<'a> {
    years: &'a BTreeMap<i32, FiscalYearSettings>,
    custom_fallback: TimeInterval,
}

impl<'a> PeriodTemplateLayer<'a> {
    pub fn new(years: &'a BTreeMap<i32, FiscalYearSettings>, custom_fallback: TimeInterval) -> Self {
        Self {
            years,
            custom_fallback,
        }
    }
}

impl WorkTimeLayer for PeriodTemplateLayer<'_> {
    fn name(&self) -> &'static str {
        "period-template"
    }

    fn resolve(&self, query: &WorkTimeQuery<'_>) -> LayerOutcome {
        let Some(year) = self.years.get(&query.fiscal_year) else {
            return LayerOutcome::Pass;
        };
        let period = query.period();
        let Some(setting) = year.day(period, query.weekday) else {
            return LayerOutcome::Pass;
        };

        let interval = shift_hours(
            setting.shift,
            setting.start.as_deref(),
            setting.end.as_deref(),
            self.custom_fallback,
        );
        LayerOutcome::Resolved(WorkTime {
            interval,
            shift: setting.shift,
            name: setting.shift.pattern().name.to_string(),
            source: WorkTimeSource::PeriodTemplate,
            period: Some(period),
            applied: false,
        })
    }
}

/// Period default shift for years that were never configured.
pub struct FallbackLayer;

impl WorkTimeLayer for FallbackLayer {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn resolve(&self, query: &WorkTimeQuery<'_>) -> LayerOutcome {
        let period = query.period();
        let shift = period.default_shift();
        match shift.interval() {
            Some(interval) => LayerOutcome::Resolved(WorkTime {
                interval,
                shift,
                name: shift.pattern().name.to_string(),
                source: WorkTimeSource::Fallback,
                period: Some(period),
                applied: false,
            }),
            None => LayerOutcome::Pass,
        }
    }
}

/// Hours of `shift`; the custom sentinel takes its own bounds and falls
/// back per bound.
fn shift_hours(
    shift: ShiftId,
    start: Option<&str>,
    end: Option<&str>,
    fallback: TimeInterval,
) -> TimeInterval {
    shift
        .interval()
        .unwrap_or_else(|| interval_or(start, end, fallback))
}

pub struct WorkTimeResolver<'a> {
    events: &'a [ImportedEvent],
    layers: Vec<Box<dyn WorkTimeLayer + 'a>>,
}

impl<'a> WorkTimeResolver<'a> {
    pub fn new(
        store: &'a WorkSettingsStore,
        events: &'a [ImportedEvent],
        config: &PlannerConfig,
    ) -> Self {
        let custom_fallback = config.custom_shift_fallback;
        Self::with_layers(
            events,
            vec![
                Box::new(WeekendLayer),
                Box::new(OverrideLayer::new(store.overrides(), custom_fallback)),
                Box::new(PeriodTemplateLayer::new(store.years(), custom_fallback)),
                Box::new(FallbackLayer),
            ],
        )
    }

    pub fn with_layers(
        events: &'a [ImportedEvent],
        layers: Vec<Box<dyn WorkTimeLayer + 'a>>,
    ) -> Self {
        Self { events, layers }
    }

    /// Effective hours of `date`, or `None` when the date has no work.
    pub fn resolve(&self, date: NaiveDate, ignore_override: bool) -> Option<WorkTime> {
        let query = WorkTimeQuery::new(date, ignore_override, self.events);
        for layer in &self.layers {
            match layer.resolve(&query) {
                LayerOutcome::Resolved(work_time) => {
                    debug!(
                        target: "app::work_time",
                        date = %format_date_key(date),
                        layer = layer.name(),
                        shift = %work_time.shift,
                        "work time resolved"
                    );
                    return Some(work_time);
                }
                LayerOutcome::NonWorking => return None,
                LayerOutcome::Pass => continue,
            }
        }
        None
    }
}

/// Picks a shift for one date. Choosing the shift the date would get anyway
/// removes the override; anything else stores it. Custom selections need
/// both bounds.
pub fn select_override(
    store: &mut WorkSettingsStore,
    events: &[ImportedEvent],
    config: &PlannerConfig,
    date: NaiveDate,
    shift: ShiftId,
    custom: Option<(&str, &str)>,
) -> AppResult<PersistSignal> {
    let underlying = WorkTimeResolver::new(store, events, config)
        .resolve(date, true)
        .map(|work_time| work_time.shift);

    if !shift.is_custom() && underlying == Some(shift) {
        return Ok(store.clear_override(date));
    }

    let (start, end) = match custom {
        Some((start, end)) if shift.is_custom() => (Some(start.to_string()), Some(end.to_string())),
        _ => (None, None),
    };
    let applied = store
        .override_for(date)
        .map_or(false, |existing| existing.shift == shift && existing.applied);
    store.set_override(
        date,
        DateOverride {
            shift,
            start,
            end,
            applied,
        },
    )
}
