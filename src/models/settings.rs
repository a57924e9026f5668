use serde::{Deserialize, Serialize};

use crate::models::time::TimeInterval;
use crate::models::timetable::PeriodTimeTable;

const DEFAULT_ARRIVAL_BUFFER_MINUTES: i64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    #[serde(default)]
    pub period_times: PeriodTimeTable,
    /// How long before the first class the work day should start.
    #[serde(default = "default_arrival_buffer")]
    pub arrival_buffer_minutes: i64,
    /// Hours of a custom shift whose start/end were never filled in.
    #[serde(default = "default_custom_hours")]
    pub custom_shift_fallback: TimeInterval,
    /// Hours reported for work-from-home entries without explicit times.
    #[serde(default = "default_work_from_home_hours")]
    pub work_from_home_fallback: TimeInterval,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            period_times: PeriodTimeTable::default(),
            arrival_buffer_minutes: default_arrival_buffer(),
            custom_shift_fallback: default_custom_hours(),
            work_from_home_fallback: default_work_from_home_hours(),
        }
    }
}

fn default_arrival_buffer() -> i64 {
    DEFAULT_ARRIVAL_BUFFER_MINUTES
}

fn default_custom_hours() -> TimeInterval {
    TimeInterval::from_minutes(8 * 60 + 30, 17 * 60)
}

fn default_work_from_home_hours() -> TimeInterval {
    TimeInterval::from_minutes(8 * 60 + 45, 17 * 60 + 15)
}
