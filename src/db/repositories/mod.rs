pub mod planner_repository;
