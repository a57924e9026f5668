use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::period::CalendarPeriod;
use crate::models::shift::ShiftId;
use crate::models::work_settings::{
    DateOverride, DateOverrides, DaySetting, FiscalYearSettings, FIRST_WEEKDAY, LAST_WEEKDAY,
};
use crate::services::schedule_utils::{ensure_window, format_date_key, parse_clock};

/// Tells the caller whether in-memory state changed and should be written
/// back to storage.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistSignal {
    Persist,
    Unchanged,
}

impl PersistSignal {
    pub fn from_changed(changed: bool) -> Self {
        if changed {
            PersistSignal::Persist
        } else {
            PersistSignal::Unchanged
        }
    }

    pub fn needs_persist(self) -> bool {
        self == PersistSignal::Persist
    }

    pub fn or(self, other: PersistSignal) -> PersistSignal {
        PersistSignal::from_changed(self.needs_persist() || other.needs_persist())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeField {
    Start,
    End,
}

/// Per-year period templates plus per-date overrides, owned by the caller
/// and passed to the engine explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSettingsStore {
    #[serde(default)]
    years: BTreeMap<i32, FiscalYearSettings>,
    #[serde(default)]
    overrides: DateOverrides,
}

impl WorkSettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(years: BTreeMap<i32, FiscalYearSettings>, overrides: DateOverrides) -> Self {
        Self { years, overrides }
    }

    pub fn years(&self) -> &BTreeMap<i32, FiscalYearSettings> {
        &self.years
    }

    pub fn overrides(&self) -> &DateOverrides {
        &self.overrides
    }

    pub fn year(&self, fiscal_year: i32) -> Option<&FiscalYearSettings> {
        self.years.get(&fiscal_year)
    }

    pub fn day_setting(
        &self,
        fiscal_year: i32,
        period: CalendarPeriod,
        weekday: u8,
    ) -> Option<&DaySetting> {
        self.years.get(&fiscal_year)?.day(period, weekday)
    }

    /// Creates the year on first access and fills any missing slot with the
    /// period default (vacations relaxed, term weekdays standard).
    pub fn ensure_year(&mut self, fiscal_year: i32) -> PersistSignal {
        let created = !self.years.contains_key(&fiscal_year);
        let added = self.years.entry(fiscal_year).or_default().fill_defaults();
        if created || added > 0 {
            info!(target: "app::settings", fiscal_year, created, added, "fiscal year bootstrapped");
        }
        PersistSignal::from_changed(created || added > 0)
    }

    /// Seeds `target` from `source`, keeping nothing of a previous `target`.
    pub fn copy_year(&mut self, source: i32, target: i32) -> AppResult<PersistSignal> {
        let mut seeded = self.years.get(&source).cloned().ok_or_else(AppError::not_found)?;
        seeded.fill_defaults();
        let changed = self.years.get(&target) != Some(&seeded);
        self.years.insert(target, seeded);
        info!(target: "app::settings", source, target, "fiscal year copied");
        Ok(PersistSignal::from_changed(changed))
    }

    pub fn set_day_shift(
        &mut self,
        fiscal_year: i32,
        period: CalendarPeriod,
        weekday: u8,
        shift: ShiftId,
    ) -> AppResult<PersistSignal> {
        ensure_weekday(weekday)?;
        let bootstrapped = self.ensure_year(fiscal_year);

        let slot = self
            .years
            .entry(fiscal_year)
            .or_default()
            .period_mut(period)
            .entry(weekday)
            .or_insert_with(|| DaySetting::shift(period.default_shift()));
        let changed = slot.shift != shift;
        slot.shift = shift;

        info!(target: "app::settings", fiscal_year, %period, weekday, %shift, "day shift updated");
        Ok(bootstrapped.or(PersistSignal::from_changed(changed)))
    }

    /// Stores one bound of a custom shift. The value must be `HH:MM`; the
    /// slot's shift identifier is left untouched.
    pub fn set_day_custom_time(
        &mut self,
        fiscal_year: i32,
        period: CalendarPeriod,
        weekday: u8,
        field: TimeField,
        value: &str,
    ) -> AppResult<PersistSignal> {
        ensure_weekday(weekday)?;
        let normalized = parse_clock(value)?.format("%H:%M").to_string();
        let bootstrapped = self.ensure_year(fiscal_year);

        let slot = self
            .years
            .entry(fiscal_year)
            .or_default()
            .period_mut(period)
            .entry(weekday)
            .or_insert_with(|| DaySetting::shift(period.default_shift()));
        let target = match field {
            TimeField::Start => &mut slot.start,
            TimeField::End => &mut slot.end,
        };
        let changed = target.as_deref() != Some(normalized.as_str());
        *target = Some(normalized);

        Ok(bootstrapped.or(PersistSignal::from_changed(changed)))
    }

    pub fn override_for(&self, date: NaiveDate) -> Option<&DateOverride> {
        self.overrides.get(&date)
    }

    /// Stores an override for `date`. Custom overrides need both bounds in
    /// `HH:MM` with start before end.
    pub fn set_override(
        &mut self,
        date: NaiveDate,
        mut date_override: DateOverride,
    ) -> AppResult<PersistSignal> {
        if date_override.shift.is_custom() {
            let (start, end) = match (date_override.start.as_deref(), date_override.end.as_deref()) {
                (Some(start), Some(end)) => (parse_clock(start)?, parse_clock(end)?),
                _ => {
                    return Err(AppError::validation_with_details(
                        "custom override needs start and end",
                        json!({"date": format_date_key(date)}),
                    ))
                }
            };
            ensure_window(start, end)?;
            date_override.start = Some(start.format("%H:%M").to_string());
            date_override.end = Some(end.format("%H:%M").to_string());
        } else {
            date_override.start = None;
            date_override.end = None;
        }

        let changed = self.overrides.get(&date) != Some(&date_override);
        info!(target: "app::settings", date = %format_date_key(date), shift = %date_override.shift, "override stored");
        self.overrides.insert(date, date_override);
        Ok(PersistSignal::from_changed(changed))
    }

    pub fn clear_override(&mut self, date: NaiveDate) -> PersistSignal {
        let removed = self.overrides.remove(&date).is_some();
        if removed {
            info!(target: "app::settings", date = %format_date_key(date), "override removed");
        }
        PersistSignal::from_changed(removed)
    }

    pub fn mark_override_applied(
        &mut self,
        date: NaiveDate,
        applied: bool,
    ) -> AppResult<PersistSignal> {
        let existing = self.overrides.get_mut(&date).ok_or_else(AppError::not_found)?;
        let changed = existing.applied != applied;
        existing.applied = applied;
        Ok(PersistSignal::from_changed(changed))
    }
}

fn ensure_weekday(weekday: u8) -> AppResult<()> {
    if (FIRST_WEEKDAY..=LAST_WEEKDAY).contains(&weekday) {
        Ok(())
    } else {
        Err(AppError::validation_with_details(
            "weekday must be between 1 (Monday) and 5 (Friday)",
            json!({"weekday": weekday}),
        ))
    }
}
