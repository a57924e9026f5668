use chrono::NaiveDate;
use school_work_planner_lib::models::calendar::ImportedEvent;
use school_work_planner_lib::models::commitment::{CommitmentItem, CommitmentKind, LeaveType};
use school_work_planner_lib::models::conflict::ConflictCandidate;
use school_work_planner_lib::models::settings::PlannerConfig;
use school_work_planner_lib::models::timetable::{ClassEntry, ClassSlot, SemesterScope};
use school_work_planner_lib::services::planner_state::PlannerState;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn event_item(id: &str, day: NaiveDate, start: &str, end: &str) -> CommitmentItem {
    CommitmentItem {
        id: id.into(),
        title: "Parent meeting".into(),
        start_date: day,
        end_date: day,
        applied: false,
        kind: CommitmentKind::Event {
            start_time: Some(start.into()),
            end_time: Some(end.into()),
            all_day: false,
        },
    }
}

fn full_day_leave(id: &str, day: NaiveDate) -> CommitmentItem {
    CommitmentItem {
        id: id.into(),
        title: "Family".into(),
        start_date: day,
        end_date: day,
        applied: false,
        kind: CommitmentKind::Leave {
            leave_type: LeaveType::Full,
            hours: 0,
            extra_minutes: 0,
        },
    }
}

#[test]
fn overlapping_windows_conflict_and_touching_ones_do_not() {
    let day = date(2026, 5, 13);
    let state = PlannerState {
        commitments: vec![event_item("e1", day, "09:00", "10:00")],
        ..PlannerState::default()
    };

    let overlapping = state.find_conflicts(&ConflictCandidate::single_day(
        day,
        Some("09:30"),
        Some("11:00"),
    ));
    assert_eq!(
        overlapping,
        vec!["2026-05-13: Event Parent meeting (09:00-10:00)".to_string()]
    );

    let touching = state.find_conflicts(&ConflictCandidate::single_day(
        day,
        Some("10:00"),
        Some("11:00"),
    ));
    assert!(touching.is_empty());
}

#[test]
fn trip_over_a_leave_day_reports_the_middle_date_once() {
    let state = PlannerState {
        commitments: vec![full_day_leave("leave-1", date(2026, 5, 11))],
        ..PlannerState::default()
    };
    let trip = ConflictCandidate::trip(
        date(2026, 5, 10),
        date(2026, 5, 12),
        Some("09:00"),
        Some("15:00"),
    );

    let conflicts = state.find_conflicts(&trip);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0], "2026-05-11: Leave Family (08:45-17:15)");
}

#[test]
fn trip_boundaries_only_bound_first_and_last_day() {
    let state = PlannerState {
        commitments: vec![
            event_item("morning", date(2026, 5, 18), "08:00", "09:00"),
            event_item("evening", date(2026, 5, 20), "16:00", "17:00"),
        ],
        ..PlannerState::default()
    };

    let trip = ConflictCandidate::trip(
        date(2026, 5, 18),
        date(2026, 5, 20),
        Some("10:00"),
        Some("15:00"),
    );
    assert!(state.find_conflicts(&trip).is_empty());

    let plain = ConflictCandidate {
        trip_like: false,
        ..trip
    };
    assert!(state.find_conflicts(&plain).is_empty());

    let all_day_middle = ConflictCandidate::trip(
        date(2026, 5, 17),
        date(2026, 5, 21),
        Some("10:00"),
        Some("15:00"),
    );
    assert_eq!(state.find_conflicts(&all_day_middle).len(), 2);
}

#[test]
fn sources_are_reported_per_date_in_fixed_order() {
    let day = date(2026, 6, 1);
    let state = PlannerState {
        schedule_events: vec![
            ImportedEvent::new("2026-06-01", "Midterm exams").with_times("09:00", "12:00"),
            ImportedEvent::new("2026-06-02", "Field trip"),
        ],
        classes: vec![ClassEntry {
            id: "c1".into(),
            name: "Chemistry".into(),
            class_year: None,
            semester_type: SemesterScope::First,
            first_semester: Some(ClassSlot {
                weekday: 1,
                period: "２〜３".into(),
            }),
            second_semester: None,
        }],
        commitments: vec![event_item("e1", day, "11:00", "11:30")],
        config: PlannerConfig::default(),
        ..PlannerState::default()
    };

    let conflicts = state.find_conflicts(&ConflictCandidate {
        start_date: day,
        end_date: date(2026, 6, 2),
        start_time: Some("11:00".into()),
        end_time: Some("13:30".into()),
        trip_like: false,
        exclude_id: None,
    });

    assert_eq!(
        conflicts,
        vec![
            "2026-06-01: Midterm exams".to_string(),
            "2026-06-01: class Chemistry (period 2-3)".to_string(),
            "2026-06-01: Event Parent meeting (11:00-11:30)".to_string(),
            "2026-06-02: Field trip".to_string(),
        ]
    );
}

#[test]
fn weekend_leave_occupies_nothing() {
    let saturday = date(2026, 5, 16);
    let state = PlannerState {
        commitments: vec![full_day_leave("leave-sat", saturday)],
        ..PlannerState::default()
    };
    assert!(state
        .find_conflicts(&ConflictCandidate::single_day(saturday, None, None))
        .is_empty());
}

#[test]
fn rechecking_an_item_skips_itself() {
    let day = date(2026, 5, 13);
    let existing = event_item("e1", day, "09:00", "10:00");
    let state = PlannerState {
        commitments: vec![existing.clone()],
        ..PlannerState::default()
    };

    assert!(state.detector().find_conflicts_for(&existing).is_empty());
    let candidate = ConflictCandidate::single_day(day, Some("09:00"), Some("10:00")).excluding("e1");
    assert!(state.find_conflicts(&candidate).is_empty());
}

fn single_day(id: &str, title: &str, day: NaiveDate, kind: CommitmentKind) -> CommitmentItem {
    CommitmentItem {
        id: id.into(),
        title: title.into(),
        start_date: day,
        end_date: day,
        applied: false,
        kind,
    }
}

#[test]
fn work_from_home_without_times_takes_the_work_day() {
    let monday = date(2026, 5, 11);
    let state = PlannerState {
        commitments: vec![single_day(
            "wfh",
            "Grading",
            monday,
            CommitmentKind::WorkFromHome {
                start_time: None,
                end_time: None,
                location: None,
            },
        )],
        ..PlannerState::default()
    };

    assert_eq!(
        state.find_conflicts(&ConflictCandidate::single_day(monday, Some("17:00"), Some("18:00"))),
        vec!["2026-05-11: Work from home Grading (08:45-17:15)".to_string()]
    );
    assert!(state
        .find_conflicts(&ConflictCandidate::single_day(monday, Some("17:15"), Some("18:00")))
        .is_empty());
}

#[test]
fn all_day_events_ignore_their_times() {
    let day = date(2026, 5, 13);
    let state = PlannerState {
        commitments: vec![single_day(
            "sports",
            "Sports day",
            day,
            CommitmentKind::Event {
                start_time: Some("09:00".into()),
                end_time: Some("10:00".into()),
                all_day: true,
            },
        )],
        ..PlannerState::default()
    };

    assert_eq!(
        state.find_conflicts(&ConflictCandidate::single_day(day, Some("14:00"), Some("15:00"))),
        vec!["2026-05-13: Event Sports day (00:00-23:59)".to_string()]
    );
}

#[test]
fn untimed_holiday_work_and_events_fill_the_day() {
    let saturday = date(2026, 5, 16);
    let state = PlannerState {
        commitments: vec![
            single_day(
                "open",
                "Open campus",
                saturday,
                CommitmentKind::HolidayWork {
                    start_time: None,
                    end_time: None,
                },
            ),
            single_day(
                "club",
                "Club match",
                saturday,
                CommitmentKind::Event {
                    start_time: None,
                    end_time: None,
                    all_day: false,
                },
            ),
        ],
        ..PlannerState::default()
    };

    assert_eq!(
        state.find_conflicts(&ConflictCandidate::single_day(saturday, Some("20:00"), Some("21:00"))),
        vec![
            "2026-05-16: Holiday work Open campus (00:00-23:59)".to_string(),
            "2026-05-16: Event Club match (00:00-23:59)".to_string(),
        ]
    );
}

#[test]
fn late_leave_only_blocks_the_end_of_the_day() {
    let monday = date(2026, 5, 11);
    let state = PlannerState {
        commitments: vec![single_day(
            "late",
            "Dentist",
            monday,
            CommitmentKind::Leave {
                leave_type: LeaveType::Late,
                hours: 2,
                extra_minutes: 0,
            },
        )],
        ..PlannerState::default()
    };

    assert_eq!(
        state.find_conflicts(&ConflictCandidate::single_day(monday, Some("16:00"), Some("16:30"))),
        vec!["2026-05-11: Leave Dentist (15:15-17:15)".to_string()]
    );
    assert!(state
        .find_conflicts(&ConflictCandidate::single_day(monday, Some("14:00"), Some("15:15")))
        .is_empty());
}
