use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Time-bounded item checked for conflicts before it is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCandidate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Start time applies to the first day only, end time to the last day only.
    #[serde(default)]
    pub trip_like: bool,
    /// Commitment to ignore, so an existing item can be re-checked.
    #[serde(default)]
    pub exclude_id: Option<String>,
}

impl ConflictCandidate {
    pub fn single_day(date: NaiveDate, start_time: Option<&str>, end_time: Option<&str>) -> Self {
        Self {
            start_date: date,
            end_date: date,
            start_time: start_time.map(str::to_string),
            end_time: end_time.map(str::to_string),
            trip_like: false,
            exclude_id: None,
        }
    }

    pub fn trip(
        start_date: NaiveDate,
        end_date: NaiveDate,
        departure: Option<&str>,
        arrival: Option<&str>,
    ) -> Self {
        Self {
            start_date,
            end_date,
            start_time: departure.map(str::to_string),
            end_time: arrival.map(str::to_string),
            trip_like: true,
            exclude_id: None,
        }
    }

    pub fn excluding(mut self, id: impl Into<String>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }
}
