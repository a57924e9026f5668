pub mod calendar;
pub mod commitment;
pub mod conflict;
pub mod period;
pub mod settings;
pub mod shift;
pub mod time;
pub mod timetable;
pub mod work_settings;
