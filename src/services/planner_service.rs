use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::NaiveDate;
use serde_json::json;
use tracing::info;

use crate::db::repositories::planner_repository::{
    PlannerRepository, KEY_COMMITMENTS, KEY_MY_CLASSES, KEY_PLANNER_CONFIG, KEY_SCHEDULE_EVENTS,
    KEY_WORK_OVERRIDES, KEY_WORK_SETTINGS,
};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::calendar::{ImportedEvent, VacationRanges};
use crate::models::commitment::{CommitmentItem, LeaveType};
use crate::models::conflict::ConflictCandidate;
use crate::models::period::CalendarPeriod;
use crate::models::settings::PlannerConfig;
use crate::models::shift::ShiftId;
use crate::models::timetable::ClassEntry;
use crate::models::work_settings::{DateOverrides, FiscalYearSettings, WorkTime};
use crate::services::application_service::{PendingShiftChange, PendingTrip, PendingWorkFromHome};
use crate::services::commitment_service::{self, LeaveOption};
use crate::services::planner_state::PlannerState;
use crate::services::schedule_utils::format_date_key;
use crate::services::shift_recommender::PeriodRecommendation;
use crate::services::work_settings_store::{PersistSignal, TimeField, WorkSettingsStore};
use crate::services::work_time_resolver;

const MAX_ARRIVAL_BUFFER_MINUTES: i64 = 180;

/// Stored JSON documents making up the planner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerDocument {
    WorkSettings,
    WorkOverrides,
    Commitments,
    ScheduleEvents,
    MyClasses,
    Config,
}

impl PlannerDocument {
    pub fn key(self) -> &'static str {
        match self {
            PlannerDocument::WorkSettings => KEY_WORK_SETTINGS,
            PlannerDocument::WorkOverrides => KEY_WORK_OVERRIDES,
            PlannerDocument::Commitments => KEY_COMMITMENTS,
            PlannerDocument::ScheduleEvents => KEY_SCHEDULE_EVENTS,
            PlannerDocument::MyClasses => KEY_MY_CLASSES,
            PlannerDocument::Config => KEY_PLANNER_CONFIG,
        }
    }
}

/// Planner state backed by SQLite. State is loaded once and cached; every
/// mutation runs on a copy and writes back only the documents it touched.
pub struct PlannerService {
    db: DbPool,
    cache: RwLock<Option<PlannerState>>,
}

impl PlannerService {
    pub fn new(db: DbPool) -> AppResult<Self> {
        Ok(Self {
            db,
            cache: RwLock::new(None),
        })
    }

    pub fn snapshot(&self) -> AppResult<PlannerState> {
        if let Ok(guard) = self.cache.read() {
            if let Some(state) = guard.as_ref() {
                return Ok(state.clone());
            }
        }

        let state = self.load_state_from_db()?;
        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(state.clone());
        }
        Ok(state)
    }

    /// Drops the cache so the next read sees what is on disk.
    pub fn reload(&self) -> AppResult<PlannerState> {
        if let Ok(mut guard) = self.cache.write() {
            *guard = None;
        }
        self.snapshot()
    }

    pub fn work_time(&self, date: NaiveDate, ignore_override: bool) -> AppResult<Option<WorkTime>> {
        Ok(self.snapshot()?.work_time(date, ignore_override))
    }

    pub fn vacation_ranges(&self, fiscal_year: i32) -> AppResult<VacationRanges> {
        Ok(self.snapshot()?.vacation_ranges(fiscal_year))
    }

    pub fn period_of(&self, date: NaiveDate) -> AppResult<CalendarPeriod> {
        Ok(self.snapshot()?.period_of(date))
    }

    pub fn recommendations(&self, fiscal_year: i32) -> AppResult<Vec<PeriodRecommendation>> {
        Ok(self.snapshot()?.recommendations(fiscal_year))
    }

    pub fn check_conflicts(&self, candidate: &ConflictCandidate) -> AppResult<Vec<String>> {
        Ok(self.snapshot()?.find_conflicts(candidate))
    }

    pub fn ensure_year(&self, fiscal_year: i32) -> AppResult<()> {
        self.mutate(&[PlannerDocument::WorkSettings], |state| {
            Ok(((), state.settings.ensure_year(fiscal_year)))
        })
    }

    pub fn copy_year(&self, source: i32, target: i32) -> AppResult<()> {
        self.mutate(&[PlannerDocument::WorkSettings], |state| {
            Ok(((), state.settings.copy_year(source, target)?))
        })
    }

    pub fn set_day_shift(
        &self,
        fiscal_year: i32,
        period: CalendarPeriod,
        weekday: u8,
        shift: ShiftId,
    ) -> AppResult<()> {
        self.mutate(&[PlannerDocument::WorkSettings], |state| {
            let signal = state
                .settings
                .set_day_shift(fiscal_year, period, weekday, shift)?;
            Ok(((), signal))
        })
    }

    pub fn set_day_custom_time(
        &self,
        fiscal_year: i32,
        period: CalendarPeriod,
        weekday: u8,
        field: TimeField,
        value: &str,
    ) -> AppResult<()> {
        self.mutate(&[PlannerDocument::WorkSettings], |state| {
            let signal = state
                .settings
                .set_day_custom_time(fiscal_year, period, weekday, field, value)?;
            Ok(((), signal))
        })
    }

    /// Applies a day-menu choice and returns the date's new effective hours.
    pub fn select_override(
        &self,
        date: NaiveDate,
        shift: ShiftId,
        custom: Option<(&str, &str)>,
    ) -> AppResult<Option<WorkTime>> {
        self.mutate(&[PlannerDocument::WorkOverrides], |state| {
            let signal = work_time_resolver::select_override(
                &mut state.settings,
                &state.schedule_events,
                &state.config,
                date,
                shift,
                custom,
            )?;
            Ok((state.work_time(date, false), signal))
        })
    }

    pub fn clear_override(&self, date: NaiveDate) -> AppResult<()> {
        self.mutate(&[PlannerDocument::WorkOverrides], |state| {
            Ok(((), state.settings.clear_override(date)))
        })
    }

    pub fn mark_override_applied(&self, date: NaiveDate, applied: bool) -> AppResult<()> {
        self.mutate(&[PlannerDocument::WorkOverrides], |state| {
            Ok(((), state.settings.mark_override_applied(date, applied)?))
        })
    }

    /// Stores a new commitment and returns its advisory conflicts.
    pub fn add_commitment(&self, item: CommitmentItem) -> AppResult<Vec<String>> {
        commitment_service::validate_commitment(&item)?;
        self.mutate(&[PlannerDocument::Commitments], |state| {
            if state.commitments.iter().any(|existing| existing.id == item.id) {
                return Err(AppError::conflict(format!(
                    "commitment {} already exists",
                    item.id
                )));
            }
            let conflicts = state.detector().find_conflicts_for(&item);
            info!(target: "app::commitment", id = %item.id, kind = item.kind.label(), conflicts = conflicts.len(), "commitment added");
            state.commitments.push(item);
            Ok((conflicts, PersistSignal::Persist))
        })
    }

    pub fn update_commitment(&self, item: CommitmentItem) -> AppResult<Vec<String>> {
        commitment_service::validate_commitment(&item)?;
        self.mutate(&[PlannerDocument::Commitments], |state| {
            let conflicts = state.detector().find_conflicts_for(&item);
            let slot = state
                .commitments
                .iter_mut()
                .find(|existing| existing.id == item.id)
                .ok_or_else(AppError::not_found)?;
            let changed = *slot != item;
            *slot = item;
            Ok((conflicts, PersistSignal::from_changed(changed)))
        })
    }

    pub fn remove_commitment(&self, id: &str) -> AppResult<()> {
        self.mutate(&[PlannerDocument::Commitments], |state| {
            let before = state.commitments.len();
            state.commitments.retain(|item| item.id != id);
            if state.commitments.len() == before {
                return Err(AppError::not_found());
            }
            info!(target: "app::commitment", id, "commitment removed");
            Ok(((), PersistSignal::Persist))
        })
    }

    pub fn mark_commitments_applied(&self, ids: &[String], applied: bool) -> AppResult<()> {
        self.mutate(&[PlannerDocument::Commitments], |state| {
            Ok((
                (),
                commitment_service::mark_applied(&mut state.commitments, ids, applied),
            ))
        })
    }

    pub fn leave_options(&self, date: NaiveDate) -> AppResult<Vec<LeaveOption>> {
        let work_time = self.work_time(date, false)?.ok_or_else(|| {
            AppError::validation_with_details(
                "no working hours on this date",
                json!({"date": format_date_key(date)}),
            )
        })?;
        Ok(commitment_service::leave_options(work_time.interval))
    }

    pub fn create_leave_card(
        &self,
        date: NaiveDate,
        title: Option<&str>,
        leave_type: LeaveType,
        hours: u32,
        extra_minutes: u32,
    ) -> AppResult<CommitmentItem> {
        self.mutate(&[PlannerDocument::Commitments], |state| {
            let card = commitment_service::create_leave_card(
                &state.resolver(),
                date,
                title,
                leave_type,
                hours,
                extra_minutes,
            )?;
            state.commitments.push(card.clone());
            Ok((card, PersistSignal::Persist))
        })
    }

    /// Replaces the imported school calendar. Vacation ranges follow on the
    /// next query.
    pub fn replace_schedule_events(&self, events: Vec<ImportedEvent>) -> AppResult<()> {
        self.mutate(&[PlannerDocument::ScheduleEvents], |state| {
            let changed = state.schedule_events != events;
            info!(target: "app::settings", count = events.len(), "school calendar replaced");
            state.schedule_events = events;
            Ok(((), PersistSignal::from_changed(changed)))
        })
    }

    pub fn replace_classes(&self, classes: Vec<ClassEntry>) -> AppResult<()> {
        self.mutate(&[PlannerDocument::MyClasses], |state| {
            let changed = state.classes != classes;
            state.classes = classes;
            Ok(((), PersistSignal::from_changed(changed)))
        })
    }

    pub fn update_config(&self, config: PlannerConfig) -> AppResult<PlannerConfig> {
        ensure_valid_config(&config)?;
        self.mutate(&[PlannerDocument::Config], |state| {
            let changed = state.config != config;
            state.config = config;
            Ok((state.config.clone(), PersistSignal::from_changed(changed)))
        })
    }

    pub fn pending_work_from_home(&self) -> AppResult<BTreeMap<String, Vec<PendingWorkFromHome>>> {
        Ok(self.snapshot()?.pending_work_from_home())
    }

    pub fn pending_trips(&self) -> AppResult<Vec<PendingTrip>> {
        Ok(self.snapshot()?.pending_trips())
    }

    pub fn pending_shift_changes(&self) -> AppResult<Vec<PendingShiftChange>> {
        Ok(self.snapshot()?.pending_shift_changes())
    }

    fn mutate<T, F>(&self, documents: &[PlannerDocument], apply: F) -> AppResult<T>
    where
        F: FnOnce(&mut PlannerState) -> AppResult<(T, PersistSignal)>,
    {
        let mut guard = self
            .cache
            .write()
            .map_err(|_| AppError::other("planner state lock poisoned"))?;
        if guard.is_none() {
            *guard = Some(self.load_state_from_db()?);
        }
        let Some(current) = guard.as_mut() else {
            return Err(AppError::other("planner state unavailable"));
        };

        let mut next = current.clone();
        let (output, signal) = apply(&mut next)?;
        if signal.needs_persist() {
            self.persist(&next, documents)?;
        }
        *current = next;
        Ok(output)
    }

    fn persist(&self, state: &PlannerState, documents: &[PlannerDocument]) -> AppResult<()> {
        self.db.with_transaction(|tx| {
            for document in documents {
                let key = document.key();
                match document {
                    PlannerDocument::WorkSettings => {
                        PlannerRepository::save_document(tx, key, state.settings.years())?
                    }
                    PlannerDocument::WorkOverrides => {
                        PlannerRepository::save_document(tx, key, state.settings.overrides())?
                    }
                    PlannerDocument::Commitments => {
                        PlannerRepository::save_document(tx, key, &state.commitments)?
                    }
                    PlannerDocument::ScheduleEvents => {
                        PlannerRepository::save_document(tx, key, &state.schedule_events)?
                    }
                    PlannerDocument::MyClasses => {
                        PlannerRepository::save_document(tx, key, &state.classes)?
                    }
                    PlannerDocument::Config => {
                        PlannerRepository::save_document(tx, key, &state.config)?
                    }
                }
                info!(target: "app::db", key, "planner document persisted");
            }
            Ok(())
        })
    }

    fn load_state_from_db(&self) -> AppResult<PlannerState> {
        self.db.with_connection(|conn| {
            let years: BTreeMap<i32, FiscalYearSettings> =
                PlannerRepository::load_map(conn, KEY_WORK_SETTINGS)?;
            let overrides: DateOverrides = PlannerRepository::load_map(conn, KEY_WORK_OVERRIDES)?;

            Ok(PlannerState {
                settings: WorkSettingsStore::from_parts(years, overrides),
                commitments: PlannerRepository::load_list(conn, KEY_COMMITMENTS)?,
                schedule_events: PlannerRepository::load_list(conn, KEY_SCHEDULE_EVENTS)?,
                classes: PlannerRepository::load_list(conn, KEY_MY_CLASSES)?,
                config: PlannerRepository::load_document(conn, KEY_PLANNER_CONFIG)?,
            })
        })
    }
}

fn ensure_valid_config(config: &PlannerConfig) -> AppResult<()> {
    if !(0..=MAX_ARRIVAL_BUFFER_MINUTES).contains(&config.arrival_buffer_minutes) {
        return Err(AppError::validation_with_details(
            "arrival buffer must be between 0 and 180 minutes",
            json!({"arrivalBufferMinutes": config.arrival_buffer_minutes}),
        ));
    }
    if !config.custom_shift_fallback.is_valid() || !config.work_from_home_fallback.is_valid() {
        return Err(AppError::validation("fallback hours must start before they end"));
    }
    Ok(())
}
