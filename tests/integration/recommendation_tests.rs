use std::collections::BTreeSet;

use school_work_planner_lib::db::DbPool;
use school_work_planner_lib::models::period::CalendarPeriod;
use school_work_planner_lib::models::settings::PlannerConfig;
use school_work_planner_lib::models::shift::ShiftId;
use school_work_planner_lib::models::timetable::{ClassEntry, ClassPeriod, ClassSlot, SemesterScope};
use school_work_planner_lib::services::planner_service::PlannerService;
use school_work_planner_lib::services::shift_recommender::{recommend, PeriodRecommendation};
use tempfile::tempdir;

fn class(
    id: &str,
    year: i32,
    scope: SemesterScope,
    first: Option<(u8, &str)>,
    second: Option<(u8, &str)>,
) -> ClassEntry {
    let slot = |(weekday, period): (u8, &str)| ClassSlot {
        weekday,
        period: period.to_string(),
    };
    ClassEntry {
        id: id.into(),
        name: id.to_uppercase(),
        class_year: Some(year),
        semester_type: scope,
        first_semester: first.map(slot),
        second_semester: second.map(slot),
    }
}

fn cell(grid: &[PeriodRecommendation], period: CalendarPeriod, weekday: u8) -> &PeriodRecommendation {
    grid.iter()
        .find(|cell| cell.period == period && cell.weekday == weekday)
        .expect("grid cell")
}

#[test]
fn year_grid_tracks_the_timetable() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("planner.sqlite")).expect("db pool");
    let service = PlannerService::new(pool).expect("planner service");

    service
        .replace_classes(vec![
            class("math", 2026, SemesterScope::Full, Some((1, "1-2")), Some((3, "3"))),
            class("lab", 2026, SemesterScope::First, Some((3, "3")), None),
            class("old", 2025, SemesterScope::Full, Some((2, "1")), Some((2, "1"))),
        ])
        .expect("store classes");
    service
        .set_day_shift(2026, CalendarPeriod::FirstSemester, 3, ShiftId::E)
        .expect("set wednesday");

    let grid = service.recommendations(2026).expect("recommendations");
    assert_eq!(grid.len(), 30);

    let monday = cell(&grid, CalendarPeriod::FirstSemester, 1);
    assert_eq!(monday.occupied, vec![ClassPeriod::First, ClassPeriod::Second]);
    assert_eq!(monday.recommended, ShiftId::B);
    assert!(monday.matches());

    let wednesday = cell(&grid, CalendarPeriod::FirstSemester, 3);
    assert_eq!(wednesday.recommended, ShiftId::E);
    assert_eq!(wednesday.configured, ShiftId::E);

    let second_term_wednesday = cell(&grid, CalendarPeriod::SecondSemester, 3);
    assert_eq!(second_term_wednesday.occupied, vec![ClassPeriod::Third]);

    let last_year_class = cell(&grid, CalendarPeriod::FirstSemester, 2);
    assert!(last_year_class.occupied.is_empty());
    assert_eq!(last_year_class.recommended, ShiftId::C);
    assert!(!last_year_class.matches());

    for vacation in [
        CalendarPeriod::SummerVacation,
        CalendarPeriod::WinterVacation,
        CalendarPeriod::EndYearVacation,
    ] {
        assert!(grid
            .iter()
            .filter(|cell| cell.period == vacation)
            .all(|cell| cell.occupied.is_empty() && cell.recommended == ShiftId::C));
    }
}

#[test]
fn longer_buffers_push_recommendations_earlier() {
    let occupied: BTreeSet<ClassPeriod> = [ClassPeriod::Second].into_iter().collect();
    let relaxed = PlannerConfig::default();
    let cautious = PlannerConfig {
        arrival_buffer_minutes: 60,
        ..PlannerConfig::default()
    };

    let start = |shift: ShiftId| shift.interval().map(|interval| interval.start_minutes());
    let late = recommend(&occupied, &relaxed);
    let early = recommend(&occupied, &cautious);
    assert_eq!(late, ShiftId::D);
    assert!(start(early) <= start(late));
}
