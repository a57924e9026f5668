use chrono::NaiveDate;
use school_work_planner_lib::db::migrations::get_migration_history;
use school_work_planner_lib::db::repositories::planner_repository::{
    PlannerRepository, KEY_COMMITMENTS, KEY_SCHEDULE_EVENTS, KEY_WORK_OVERRIDES,
    KEY_WORK_SETTINGS,
};
use school_work_planner_lib::db::DbPool;
use school_work_planner_lib::error::AppError;
use school_work_planner_lib::models::commitment::{CommitmentItem, CommitmentKind, LeaveType};
use school_work_planner_lib::models::conflict::ConflictCandidate;
use school_work_planner_lib::models::period::CalendarPeriod;
use school_work_planner_lib::models::settings::PlannerConfig;
use school_work_planner_lib::models::shift::ShiftId;
use school_work_planner_lib::models::work_settings::WorkTimeSource;
use school_work_planner_lib::services::planner_service::PlannerService;
use tempfile::tempdir;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn meeting(id: &str, day: NaiveDate) -> CommitmentItem {
    CommitmentItem {
        id: id.into(),
        title: "Staff meeting".into(),
        start_date: day,
        end_date: day,
        applied: false,
        kind: CommitmentKind::Event {
            start_time: Some("15:00".into()),
            end_time: Some("16:00".into()),
            all_day: false,
        },
    }
}

#[test]
fn planner_state_survives_a_restart() {
    let dir = tempdir().expect("temp dir");
    let db_path = dir.path().join("planner.sqlite");

    let monday = date(2026, 5, 11);
    let tuesday = date(2026, 5, 12);
    {
        let pool = DbPool::new(&db_path).expect("db pool");
        let service = PlannerService::new(pool).expect("planner service");

        service
            .set_day_shift(2026, CalendarPeriod::FirstSemester, 2, ShiftId::E)
            .expect("set tuesday shift");
        let selected = service
            .select_override(monday, ShiftId::Other, Some(("07:30", "16:00")))
            .expect("select override")
            .expect("work time");
        assert_eq!(selected.source, WorkTimeSource::Override);
        assert_eq!(selected.interval.to_string(), "07:30-16:00");

        let conflicts = service
            .add_commitment(meeting("m1", monday))
            .expect("add commitment");
        assert!(conflicts.is_empty());

        let leave = service
            .create_leave_card(tuesday, None, LeaveType::Early, 2, 0)
            .expect("leave card");
        assert!(leave.id.starts_with("leave-"));
    }

    let pool = DbPool::new(&db_path).expect("db pool");
    let service = PlannerService::new(pool).expect("planner service");
    let state = service.snapshot().expect("snapshot");

    assert_eq!(state.commitments.len(), 2);
    let tuesday_hours = service
        .work_time(tuesday, false)
        .expect("work time")
        .expect("tuesday works");
    assert_eq!(tuesday_hours.shift, ShiftId::E);

    let monday_hours = service
        .work_time(monday, false)
        .expect("work time")
        .expect("monday works");
    assert_eq!(monday_hours.interval.to_string(), "07:30-16:00");

    let pending = service.pending_shift_changes().expect("pending changes");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].date, monday);
}

#[test]
fn choosing_the_underlying_shift_removes_the_override() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("planner.sqlite")).expect("db pool");
    let service = PlannerService::new(pool.clone()).expect("planner service");
    let day = date(2026, 6, 10);

    service
        .select_override(day, ShiftId::A, None)
        .expect("select override");
    let restored = service
        .select_override(day, ShiftId::B, None)
        .expect("select underlying")
        .expect("work time");

    assert_eq!(restored.source, WorkTimeSource::Fallback);
    assert_eq!(restored.shift, ShiftId::B);
    let stored = pool
        .with_connection(|conn| PlannerRepository::get(conn, KEY_WORK_OVERRIDES))
        .expect("read overrides")
        .expect("overrides row");
    assert_eq!(stored.value, "{}");
}

#[test]
fn failed_mutations_leave_state_untouched() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("planner.sqlite")).expect("db pool");
    let service = PlannerService::new(pool).expect("planner service");
    let monday = date(2026, 5, 11);

    service
        .add_commitment(meeting("m1", monday))
        .expect("add commitment");
    let duplicate = service.add_commitment(meeting("m1", monday));
    assert!(matches!(duplicate, Err(AppError::Conflict { .. })));

    let weekend = service.create_leave_card(date(2026, 5, 16), None, LeaveType::Full, 0, 0);
    assert!(matches!(weekend, Err(AppError::Validation { .. })));

    let bad_weekday = service
        .set_day_shift(2026, CalendarPeriod::FirstSemester, 6, ShiftId::A)
        .expect_err("saturday is not configurable");
    assert!(matches!(bad_weekday, AppError::Validation { .. }));
    assert_eq!(
        bad_weekday.validation_details().and_then(|details| details["weekday"].as_u64()),
        Some(6)
    );

    let unknown = service.update_commitment(meeting("missing", monday));
    assert!(matches!(unknown, Err(AppError::NotFound)));

    let config = PlannerConfig {
        arrival_buffer_minutes: 500,
        ..PlannerConfig::default()
    };
    assert!(service.update_config(config).is_err());

    let state = service.reload().expect("reload");
    assert_eq!(state.commitments.len(), 1);
    assert_eq!(state.config, PlannerConfig::default());
    assert!(state.settings.years().is_empty());
}

#[test]
fn advisory_conflicts_do_not_block_writes() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("planner.sqlite")).expect("db pool");
    let service = PlannerService::new(pool).expect("planner service");
    let monday = date(2026, 5, 11);

    service
        .add_commitment(meeting("m1", monday))
        .expect("first meeting");
    let conflicts = service
        .add_commitment(meeting("m2", monday))
        .expect("second meeting");
    assert_eq!(
        conflicts,
        vec!["2026-05-11: Event Staff meeting (15:00-16:00)".to_string()]
    );

    let candidate = ConflictCandidate::single_day(monday, Some("15:30"), Some("17:00"));
    assert_eq!(service.check_conflicts(&candidate).expect("check").len(), 1);

    service.remove_commitment("m2").expect("remove");
    assert!(matches!(
        service.remove_commitment("m2"),
        Err(AppError::NotFound)
    ));
}

#[test]
fn malformed_documents_fall_back_to_defaults() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("planner.sqlite")).expect("db pool");

    pool.with_connection(|conn| {
        PlannerRepository::upsert(conn, KEY_WORK_SETTINGS, "{not json")?;
        PlannerRepository::upsert(conn, KEY_COMMITMENTS, "42")
    })
    .expect("write malformed documents");

    let service = PlannerService::new(pool).expect("planner service");
    let state = service.snapshot().expect("snapshot");
    assert!(state.settings.years().is_empty());
    assert!(state.commitments.is_empty());

    let monday = service
        .work_time(date(2026, 5, 11), false)
        .expect("work time")
        .expect("monday works");
    assert_eq!(monday.source, WorkTimeSource::Fallback);
}

#[test]
fn damaged_entries_are_dropped_without_losing_their_neighbours() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("planner.sqlite")).expect("db pool");

    pool.with_connection(|conn| {
        PlannerRepository::upsert(
            conn,
            KEY_COMMITMENTS,
            r#"[
                {"id":"keep","title":"Keep","startDate":"2026-05-11","endDate":"2026-05-11","kind":"event","startTime":"09:00","endTime":"10:00"},
                {"id":"slashed","title":"Slashed","startDate":"2026/05/12","endDate":"2026/05/12","kind":"holidayWork"},
                {"id":"broken","title":"Broken","startDate":"someday","endDate":"2026-05-13","kind":"event"}
            ]"#,
        )?;
        PlannerRepository::upsert(
            conn,
            KEY_SCHEDULE_EVENTS,
            r#"[{"date":"2026-08-01","name":"夏季休業"},{"name":"no date"}]"#,
        )?;
        PlannerRepository::upsert(
            conn,
            KEY_WORK_OVERRIDES,
            r#"{"2026-05-14":{"shift":"A"},"not-a-date":{"shift":"B"}}"#,
        )
    })
    .expect("write stored documents");

    let service = PlannerService::new(pool.clone()).expect("planner service");
    let state = service.snapshot().expect("snapshot");
    let ids: Vec<&str> = state.commitments.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["keep", "slashed"]);
    assert_eq!(state.commitments[1].start_date, date(2026, 5, 12));
    assert_eq!(state.schedule_events.len(), 1);
    assert_eq!(state.settings.overrides().len(), 1);
    assert_eq!(
        service.period_of(date(2026, 8, 1)).expect("period"),
        CalendarPeriod::SummerVacation
    );

    service
        .add_commitment(meeting("new", date(2026, 5, 15)))
        .expect("add commitment");

    let reloaded = PlannerService::new(pool).expect("planner service");
    let stored: Vec<String> = reloaded
        .snapshot()
        .expect("snapshot")
        .commitments
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(stored, vec!["keep", "slashed", "new"]);
}

#[test]
fn fresh_database_records_its_migrations() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("nested").join("planner.sqlite")).expect("db pool");

    let history = pool
        .with_connection(|conn| get_migration_history(conn))
        .expect("migration history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].description, "Seed default planner configuration");
}
