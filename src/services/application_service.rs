//! Commitments and overrides still waiting to be submitted for approval,
//! shaped the way the paperwork needs them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::commitment::{CommitmentItem, CommitmentKind, TravelPoint};
use crate::models::shift::ShiftId;
use crate::models::time::TimeInterval;
use crate::services::schedule_utils::interval_or;
use crate::services::work_settings_store::WorkSettingsStore;
use crate::services::work_time_resolver::WorkTimeResolver;

/// Work-from-home days of four hours or more report this lunch break.
const LUNCH_THRESHOLD_MINUTES: u32 = 240;
const LUNCH_BREAK: (u32, u32) = (12 * 60 + 20, 13 * 60 + 5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingWorkFromHome {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub location: Option<String>,
    pub lunch_break: Option<TimeInterval>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTrip {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub destination: String,
    pub departure_point: TravelPoint,
    pub arrival_point: TravelPoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingShiftChange {
    pub date: NaiveDate,
    pub shift: ShiftId,
    pub interval: TimeInterval,
}

/// Unsubmitted work-from-home items keyed by `YYYY-MM` of their first day.
/// Items without explicit hours report `fallback`.
pub fn pending_work_from_home_by_month(
    commitments: &[CommitmentItem],
    fallback: TimeInterval,
) -> BTreeMap<String, Vec<PendingWorkFromHome>> {
    let mut groups: BTreeMap<String, Vec<PendingWorkFromHome>> = BTreeMap::new();

    for item in commitments.iter().filter(|item| !item.applied) {
        let CommitmentKind::WorkFromHome {
            start_time,
            end_time,
            location,
        } = &item.kind
        else {
            continue;
        };

        let interval = interval_or(start_time.as_deref(), end_time.as_deref(), fallback);
        let lunch_break = (interval.end_minutes().saturating_sub(interval.start_minutes())
            >= LUNCH_THRESHOLD_MINUTES)
            .then(|| TimeInterval::from_minutes(LUNCH_BREAK.0, LUNCH_BREAK.1));

        groups
            .entry(item.start_date.format("%Y-%m").to_string())
            .or_default()
            .push(PendingWorkFromHome {
                id: item.id.clone(),
                title: item.title.clone(),
                date: item.start_date,
                interval,
                location: location.clone(),
                lunch_break,
            });
    }

    for items in groups.values_mut() {
        items.sort_by_key(|entry| entry.date);
    }
    groups
}

/// Unsubmitted trips in start-date order. Missing travel points default to
/// home.
pub fn pending_trips(commitments: &[CommitmentItem]) -> Vec<PendingTrip> {
    let mut trips: Vec<PendingTrip> = commitments
        .iter()
        .filter(|item| !item.applied)
        .filter_map(|item| match &item.kind {
            CommitmentKind::Trip {
                destination,
                departure_point,
                arrival_point,
                ..
            } => Some(PendingTrip {
                id: item.id.clone(),
                title: item.title.clone(),
                start_date: item.start_date,
                end_date: item.end_date,
                destination: destination.clone().unwrap_or_else(|| item.title.clone()),
                departure_point: departure_point.unwrap_or(TravelPoint::Home),
                arrival_point: arrival_point.unwrap_or(TravelPoint::Home),
            }),
            _ => None,
        })
        .collect();
    trips.sort_by_key(|trip| trip.start_date);
    trips
}

/// Overrides not yet submitted as shift-change requests, with their hours.
pub fn pending_shift_changes(
    store: &WorkSettingsStore,
    resolver: &WorkTimeResolver<'_>,
) -> Vec<PendingShiftChange> {
    store
        .overrides()
        .iter()
        .filter(|(_, date_override)| !date_override.applied)
        .filter_map(|(date, _)| {
            let work_time = resolver.resolve(*date, false)?;
            Some(PendingShiftChange {
                date: *date,
                shift: work_time.shift,
                interval: work_time.interval,
            })
        })
        .collect()
}
