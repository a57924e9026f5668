use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::calendar::{ImportedEvent, VacationRanges};
use crate::models::commitment::CommitmentItem;
use crate::models::conflict::ConflictCandidate;
use crate::models::period::CalendarPeriod;
use crate::models::settings::PlannerConfig;
use crate::models::timetable::ClassEntry;
use crate::models::work_settings::WorkTime;
use crate::services::application_service::{
    self, PendingShiftChange, PendingTrip, PendingWorkFromHome,
};
use crate::services::conflict_detector::ConflictDetector;
use crate::services::shift_recommender::{self, PeriodRecommendation};
use crate::services::vacation_classifier;
use crate::services::work_settings_store::WorkSettingsStore;
use crate::services::work_time_resolver::WorkTimeResolver;

/// Everything the engine reads, loaded in memory and owned by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannerState {
    pub settings: WorkSettingsStore,
    pub commitments: Vec<CommitmentItem>,
    pub schedule_events: Vec<ImportedEvent>,
    pub classes: Vec<ClassEntry>,
    pub config: PlannerConfig,
}

impl PlannerState {
    pub fn resolver(&self) -> WorkTimeResolver<'_> {
        WorkTimeResolver::new(&self.settings, &self.schedule_events, &self.config)
    }

    pub fn detector(&self) -> ConflictDetector<'_> {
        ConflictDetector::new(
            self.resolver(),
            &self.schedule_events,
            &self.classes,
            &self.commitments,
            &self.config.period_times,
        )
    }

    pub fn work_time(&self, date: NaiveDate, ignore_override: bool) -> Option<WorkTime> {
        self.resolver().resolve(date, ignore_override)
    }

    pub fn vacation_ranges(&self, fiscal_year: i32) -> VacationRanges {
        vacation_classifier::classify(fiscal_year, &self.schedule_events)
    }

    pub fn period_of(&self, date: NaiveDate) -> CalendarPeriod {
        vacation_classifier::classify_date(date, &self.schedule_events)
    }

    pub fn find_conflicts(&self, candidate: &ConflictCandidate) -> Vec<String> {
        self.detector().find_conflicts(candidate)
    }

    pub fn recommendations(&self, fiscal_year: i32) -> Vec<PeriodRecommendation> {
        shift_recommender::recommend_for_year(
            &self.settings,
            &self.classes,
            fiscal_year,
            &self.config,
        )
    }

    pub fn pending_work_from_home(&self) -> BTreeMap<String, Vec<PendingWorkFromHome>> {
        application_service::pending_work_from_home_by_month(
            &self.commitments,
            self.config.work_from_home_fallback,
        )
    }

    pub fn pending_trips(&self) -> Vec<PendingTrip> {
        application_service::pending_trips(&self.commitments)
    }

    pub fn pending_shift_changes(&self) -> Vec<PendingShiftChange> {
        application_service::pending_shift_changes(&self.settings, &self.resolver())
    }
}
