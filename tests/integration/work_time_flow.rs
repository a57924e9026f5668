use chrono::{Datelike, NaiveDate, Weekday};
use school_work_planner_lib::models::calendar::ImportedEvent;
use school_work_planner_lib::models::period::CalendarPeriod;
use school_work_planner_lib::models::settings::PlannerConfig;
use school_work_planner_lib::models::shift::ShiftId;
use school_work_planner_lib::models::work_settings::{DateOverride, WorkTimeSource};
use school_work_planner_lib::services::schedule_utils::{dates_between, shift_clock};
use school_work_planner_lib::services::vacation_classifier;
use school_work_planner_lib::services::work_settings_store::WorkSettingsStore;
use school_work_planner_lib::services::work_time_resolver::{self, WorkTimeResolver};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn school_calendar() -> Vec<ImportedEvent> {
    vec![
        ImportedEvent::new("2026-04-01", "春季休業"),
        ImportedEvent::new("2026-04-07", "春季休業"),
        ImportedEvent::new("2026/07/21", "夏季休業"),
        ImportedEvent::new("2026/09/30", "夏季休業"),
        ImportedEvent::new("2026-12-23", "冬季休業"),
        ImportedEvent::new("2027-01-07", "冬季休業"),
        ImportedEvent::new("2027-03-15", "学年末休業"),
        ImportedEvent::new("2027-04-01", "春季休業"),
    ]
}

#[test]
fn configured_monday_resolves_to_its_shift() {
    let mut store = WorkSettingsStore::new();
    let _signal = store
        .set_day_shift(2026, CalendarPeriod::FirstSemester, 1, ShiftId::B)
        .expect("set monday shift");
    let config = PlannerConfig::default();
    let resolver = WorkTimeResolver::new(&store, &[], &config);

    let monday = date(2026, 5, 11);
    assert_eq!(monday.weekday(), Weekday::Mon);
    let work_time = resolver.resolve(monday, false).expect("work time");
    assert_eq!(work_time.interval.start.format("%H:%M").to_string(), "08:45");
    assert_eq!(work_time.interval.end.format("%H:%M").to_string(), "17:15");
}

#[test]
fn weekends_have_no_hours_in_any_configuration() {
    let mut store = WorkSettingsStore::new();
    assert!(store.ensure_year(2026).needs_persist());
    let events = school_calendar();
    let config = PlannerConfig::default();

    for day in dates_between(date(2026, 4, 1), date(2027, 3, 31))
        .filter(|day| matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .take(20)
    {
        let _signal = store
            .set_override(
                day,
                DateOverride {
                    shift: ShiftId::A,
                    start: None,
                    end: None,
                    applied: false,
                },
            )
            .expect("store override");
    }

    let resolver = WorkTimeResolver::new(&store, &events, &config);
    for day in dates_between(date(2026, 4, 1), date(2027, 3, 31))
        .filter(|day| matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
    {
        assert!(resolver.resolve(day, false).is_none(), "{day} resolved");
        assert!(resolver.resolve(day, true).is_none(), "{day} resolved");
    }
}

#[test]
fn vacation_periods_pick_their_own_template() {
    let mut store = WorkSettingsStore::new();
    let _signal = store
        .set_day_shift(2026, CalendarPeriod::SummerVacation, 3, ShiftId::E)
        .expect("summer wednesday");
    let _signal = store
        .set_day_shift(2026, CalendarPeriod::EndYearVacation, 3, ShiftId::D)
        .expect("year-end wednesday");
    let events = school_calendar();
    let config = PlannerConfig::default();
    let resolver = WorkTimeResolver::new(&store, &events, &config);

    let summer = resolver.resolve(date(2026, 8, 5), false).expect("summer day");
    assert_eq!(summer.shift, ShiftId::E);
    assert_eq!(summer.period, Some(CalendarPeriod::SummerVacation));

    // Year-end vacation always runs to March 31.
    let year_end = resolver.resolve(date(2027, 3, 31), false).expect("year-end day");
    assert_eq!(year_end.shift, ShiftId::D);
    assert_eq!(year_end.period, Some(CalendarPeriod::EndYearVacation));

    let spring = resolver.resolve(date(2026, 4, 6), false).expect("spring day");
    assert_eq!(spring.period, Some(CalendarPeriod::SpringVacation));
    assert_eq!(spring.shift, ShiftId::C);
}

#[test]
fn fiscal_years_are_classified_independently() {
    let events = school_calendar();
    let ranges_2026 = vacation_classifier::classify(2026, &events);
    let ranges_2027 = vacation_classifier::classify(2027, &events);

    assert_eq!(ranges_2026.spring_vac.end, Some(date(2026, 4, 7)));
    assert_eq!(ranges_2027.spring_vac.start, Some(date(2027, 4, 1)));
    assert!(!ranges_2027.summer_vac.is_known());

    let store = WorkSettingsStore::new();
    let config = PlannerConfig::default();
    let resolver = WorkTimeResolver::new(&store, &events, &config);
    let next_summer = resolver.resolve(date(2027, 8, 4), false).expect("work time");
    assert_eq!(next_summer.period, Some(CalendarPeriod::FirstSemester));
    assert_eq!(next_summer.shift, ShiftId::B);
}

#[test]
fn override_differs_from_underlying_until_ignored() {
    let mut store = WorkSettingsStore::new();
    let events = school_calendar();
    let config = PlannerConfig::default();
    let day = date(2026, 6, 10);

    let signal =
        work_time_resolver::select_override(&mut store, &events, &config, day, ShiftId::D, None)
            .expect("select override");
    assert!(signal.needs_persist());

    let resolver = WorkTimeResolver::new(&store, &events, &config);
    let honored = resolver.resolve(day, false).expect("override");
    let ignored = resolver.resolve(day, true).expect("template");
    assert_eq!(honored.source, WorkTimeSource::Override);
    assert_eq!(honored.shift, ShiftId::D);
    assert_ne!(honored, ignored);
    assert_eq!(ignored, resolver.resolve(day, true).expect("template"));
}

#[test]
fn clock_strings_wrap_like_a_wall_clock() {
    assert_eq!(shift_clock("00:10", -20).expect("wrap back"), "23:50");
    assert_eq!(shift_clock("17:15", 60).expect("later"), "18:15");
}
