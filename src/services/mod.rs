pub mod application_service;
pub mod commitment_service;
pub mod conflict_detector;
pub mod planner_service;
pub mod planner_state;
pub mod schedule_utils;
pub mod shift_recommender;
pub mod vacation_classifier;
pub mod work_settings_store;
pub mod work_time_resolver;
