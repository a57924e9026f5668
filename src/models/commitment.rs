use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::services::schedule_utils::deserialize_date_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeaveType {
    /// Taken from the start of the work day.
    Early,
    /// Taken up to the end of the work day.
    Late,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TravelPoint {
    School,
    Home,
}

/// Per-kind payload of a user-registered commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CommitmentKind {
    #[serde(rename_all = "camelCase")]
    Leave {
        leave_type: LeaveType,
        #[serde(default)]
        hours: u32,
        #[serde(default)]
        extra_minutes: u32,
    },
    #[serde(rename_all = "camelCase")]
    Trip {
        #[serde(default)]
        departure_time: Option<String>,
        #[serde(default)]
        arrival_time: Option<String>,
        #[serde(default)]
        destination: Option<String>,
        #[serde(default)]
        departure_point: Option<TravelPoint>,
        #[serde(default)]
        arrival_point: Option<TravelPoint>,
    },
    #[serde(rename_all = "camelCase")]
    WorkFromHome {
        #[serde(default)]
        start_time: Option<String>,
        #[serde(default)]
        end_time: Option<String>,
        #[serde(default)]
        location: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    HolidayWork {
        #[serde(default)]
        start_time: Option<String>,
        #[serde(default)]
        end_time: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Event {
        #[serde(default)]
        start_time: Option<String>,
        #[serde(default)]
        end_time: Option<String>,
        #[serde(default)]
        all_day: bool,
    },
}

impl CommitmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            CommitmentKind::Leave { .. } => "Leave",
            CommitmentKind::Trip { .. } => "Trip",
            CommitmentKind::WorkFromHome { .. } => "Work from home",
            CommitmentKind::HolidayWork { .. } => "Holiday work",
            CommitmentKind::Event { .. } => "Event",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(deserialize_with = "deserialize_date_key")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_date_key")]
    pub end_date: NaiveDate,
    /// Submitted for approval.
    #[serde(default)]
    pub applied: bool,
    #[serde(flatten)]
    pub kind: CommitmentKind,
}

impl CommitmentItem {
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}
