use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::commitment::{CommitmentItem, CommitmentKind, LeaveType};
use crate::models::time::{clock_from_minutes, TimeInterval};
use crate::services::schedule_utils::{format_date_key, parse_clock};
use crate::services::work_settings_store::PersistSignal;
use crate::services::work_time_resolver::WorkTimeResolver;

const LAST_MINUTE_OF_DAY: i64 = 23 * 60 + 59;
/// Break included in leaves of five hours or more.
const LONG_LEAVE_BREAK_MINUTES: u32 = 45;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveOption {
    pub label: String,
    pub leave_type: LeaveType,
    pub hours: u32,
    pub extra_minutes: u32,
    pub interval: TimeInterval,
}

/// Hours a leave takes out of `work`. Early leave runs from the start of the
/// work day, late leave up to its end, full leave covers all of it.
pub fn leave_window(
    work: TimeInterval,
    leave_type: LeaveType,
    hours: u32,
    extra_minutes: u32,
) -> TimeInterval {
    let duration = i64::from(hours) * 60 + i64::from(extra_minutes);
    let start = i64::from(work.start_minutes());
    let end = i64::from(work.end_minutes());
    let clamp = |minute: i64| clock_from_minutes(minute.clamp(0, LAST_MINUTE_OF_DAY) as u32);

    match leave_type {
        LeaveType::Early => TimeInterval::new(work.start, clamp(start + duration)),
        LeaveType::Late => TimeInterval::new(clamp(end - duration), work.end),
        LeaveType::Full => work,
    }
}

fn leave_label(leave_type: LeaveType, hours: u32, extra_minutes: u32) -> String {
    let side = match leave_type {
        LeaveType::Early => "Morning",
        LeaveType::Late => "Afternoon",
        LeaveType::Full => return "Full-day leave".to_string(),
    };
    match (hours, extra_minutes) {
        (4, 0) => format!("{side} {hours}h leave (half day)"),
        (_, 0) => format!("{side} {hours}h leave"),
        (_, extra) => format!("{side} {hours}h leave (incl. {extra} min break)"),
    }
}

/// Menu of hourly leaves for a day with `work` hours.
pub fn leave_options(work: TimeInterval) -> Vec<LeaveOption> {
    let mut options = Vec::with_capacity(13);
    for leave_type in [LeaveType::Early, LeaveType::Late] {
        for hours in 1..=6 {
            let extra_minutes = if hours >= 5 { LONG_LEAVE_BREAK_MINUTES } else { 0 };
            options.push(LeaveOption {
                label: leave_label(leave_type, hours, extra_minutes),
                leave_type,
                hours,
                extra_minutes,
                interval: leave_window(work, leave_type, hours, extra_minutes),
            });
        }
    }
    options.push(LeaveOption {
        label: leave_label(LeaveType::Full, 0, 0),
        leave_type: LeaveType::Full,
        hours: 0,
        extra_minutes: 0,
        interval: work,
    });
    options
}

/// Builds a leave commitment for `date`. The card stores the leave rule, not
/// clock times, so it follows later changes to the day's work hours.
pub fn create_leave_card(
    resolver: &WorkTimeResolver<'_>,
    date: NaiveDate,
    title: Option<&str>,
    leave_type: LeaveType,
    hours: u32,
    extra_minutes: u32,
) -> AppResult<CommitmentItem> {
    if resolver.resolve(date, false).is_none() {
        return Err(AppError::validation_with_details(
            "leave can only be taken on a working day",
            json!({"date": format_date_key(date)}),
        ));
    }
    if leave_type != LeaveType::Full && hours == 0 {
        return Err(AppError::validation("hourly leave needs at least one hour"));
    }

    let title = title
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| leave_label(leave_type, hours, 0));
    let item = CommitmentItem {
        id: format!("leave-{}", Uuid::new_v4()),
        title,
        start_date: date,
        end_date: date,
        applied: false,
        kind: CommitmentKind::Leave {
            leave_type,
            hours,
            extra_minutes,
        },
    };

    info!(target: "app::commitment", id = %item.id, date = %format_date_key(date), "leave card created");
    Ok(item)
}

/// Rejects items whose date range runs backwards or whose explicit times do
/// not parse.
pub fn validate_commitment(item: &CommitmentItem) -> AppResult<()> {
    if item.id.trim().is_empty() {
        return Err(AppError::validation("commitment id must not be empty"));
    }
    if item.end_date < item.start_date {
        return Err(AppError::validation_with_details(
            "commitment ends before it starts",
            json!({
                "startDate": format_date_key(item.start_date),
                "endDate": format_date_key(item.end_date),
            }),
        ));
    }

    let times: [Option<&str>; 2] = match &item.kind {
        CommitmentKind::Trip {
            departure_time,
            arrival_time,
            ..
        } => [departure_time.as_deref(), arrival_time.as_deref()],
        CommitmentKind::WorkFromHome {
            start_time,
            end_time,
            ..
        }
        | CommitmentKind::HolidayWork {
            start_time,
            end_time,
        }
        | CommitmentKind::Event {
            start_time,
            end_time,
            ..
        } => [start_time.as_deref(), end_time.as_deref()],
        CommitmentKind::Leave { .. } => [None, None],
    };
    for value in times.into_iter().flatten() {
        if !value.trim().is_empty() {
            parse_clock(value)?;
        }
    }
    Ok(())
}

/// Sets the submitted flag of every listed commitment; unknown ids are ignored.
pub fn mark_applied(
    commitments: &mut [CommitmentItem],
    ids: &[String],
    applied: bool,
) -> PersistSignal {
    let mut changed = 0usize;
    for item in commitments
        .iter_mut()
        .filter(|item| ids.iter().any(|id| *id == item.id))
    {
        if item.applied != applied {
            item.applied = applied;
            changed += 1;
        }
    }
    if changed > 0 {
        info!(target: "app::commitment", changed, applied, "commitments marked");
    }
    PersistSignal::from_changed(changed > 0)
}
