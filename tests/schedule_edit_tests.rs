// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cadence::engine::{create_schedule, delete_schedule, edit_schedule, list_schedules, tick};
use cadence::error::ScheduleError;
use cadence::frequency::Frequency;
use cadence::ledger::list_occurrences;
use cadence::models::{NewSchedule, ScheduleEdit, ScheduleKind};
use cadence::{db, store};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Monthly gym membership for owner 1, started 2024-01-05 and defined on
/// 2024-03-10: back-fills Jan, Feb and Mar, cursor at 2024-04-05.
fn gym(conn: &mut Connection) -> i64 {
    let new = NewSchedule {
        owner_id: 1,
        kind: ScheduleKind::Expense,
        amount: Decimal::new(4500, 2),
        description: "Gym".into(),
        category: "Health".into(),
        frequency: Frequency::Monthly,
        start_date: d("2024-01-05"),
        end_date: None,
    };
    create_schedule(conn, &new, d("2024-03-10")).unwrap().0
}

#[test]
fn edit_amount_leaves_history_alone() {
    let mut conn = setup();
    let id = gym(&mut conn);
    let before = list_occurrences(&conn, 1, None).unwrap();
    assert_eq!(before.len(), 3);

    let edit = ScheduleEdit {
        amount: Some(Decimal::new(5000, 2)),
        description: Some("Gym (new rate)".into()),
        ..Default::default()
    };
    let s = edit_schedule(&mut conn, id, 1, &edit).unwrap();
    assert_eq!(s.amount, Decimal::new(5000, 2));
    assert_eq!(s.next_occurrence, d("2024-04-05"));

    let after = list_occurrences(&conn, 1, None).unwrap();
    assert_eq!(after.len(), 3);
    assert!(after.iter().all(|r| r.amount == "45.00" && r.description == "Gym"));

    tick(&mut conn, d("2024-04-05")).unwrap();
    let april = list_occurrences(&conn, 1, Some("2024-04")).unwrap();
    assert_eq!(april.len(), 1);
    assert_eq!(april[0].amount, "50.00");
    assert_eq!(april[0].description, "Gym (new rate)");
}

#[test]
fn earlier_start_does_not_rewind_cursor() {
    let mut conn = setup();
    let id = gym(&mut conn);
    let edit = ScheduleEdit {
        start_date: Some(d("2023-06-01")),
        ..Default::default()
    };
    let s = edit_schedule(&mut conn, id, 1, &edit).unwrap();
    assert_eq!(s.start_date, d("2023-06-01"));
    assert_eq!(s.next_occurrence, d("2024-04-05"));
    assert_eq!(list_occurrences(&conn, 1, None).unwrap().len(), 3);
}

#[test]
fn later_start_moves_cursor_forward() {
    let mut conn = setup();
    let id = gym(&mut conn);
    let edit = ScheduleEdit {
        start_date: Some(d("2024-06-20")),
        frequency: Some(Frequency::Quarterly),
        ..Default::default()
    };
    let s = edit_schedule(&mut conn, id, 1, &edit).unwrap();
    assert_eq!(s.next_occurrence, d("2024-06-20"));
    assert_eq!(store::get(&conn, id).unwrap().unwrap(), s);

    assert_eq!(tick(&mut conn, d("2024-04-05")).unwrap().realized, 0);
    assert_eq!(tick(&mut conn, d("2024-06-20")).unwrap().realized, 1);
    assert_eq!(store::get(&conn, id).unwrap().unwrap().next_occurrence, d("2024-09-20"));
}

#[test]
fn end_before_start_is_rejected_without_change() {
    let mut conn = setup();
    let id = gym(&mut conn);
    let edit = ScheduleEdit {
        amount: Some(Decimal::ONE),
        end_date: Some(Some(d("2023-12-31"))),
        ..Default::default()
    };
    let err = edit_schedule(&mut conn, id, 1, &edit).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidRange { .. }));
    assert_eq!(store::get(&conn, id).unwrap().unwrap().amount, Decimal::new(4500, 2));
}

#[test]
fn end_date_can_be_set_and_cleared() {
    let mut conn = setup();
    let id = gym(&mut conn);
    let set = ScheduleEdit {
        end_date: Some(Some(d("2024-04-30"))),
        ..Default::default()
    };
    edit_schedule(&mut conn, id, 1, &set).unwrap();
    tick(&mut conn, d("2024-04-05")).unwrap();
    assert_eq!(tick(&mut conn, d("2024-05-05")).unwrap().due, 0);

    let clear = ScheduleEdit {
        end_date: Some(None),
        ..Default::default()
    };
    let s = edit_schedule(&mut conn, id, 1, &clear).unwrap();
    assert_eq!(s.end_date, None);
    assert_eq!(tick(&mut conn, d("2024-05-05")).unwrap().realized, 1);
}

#[test]
fn edit_requires_owner_and_existing_schedule() {
    let mut conn = setup();
    let id = gym(&mut conn);
    let edit = ScheduleEdit {
        amount: Some(Decimal::ZERO),
        ..Default::default()
    };
    match edit_schedule(&mut conn, id, 2, &edit) {
        Err(ScheduleError::NotAuthorized { id: got, owner }) => {
            assert_eq!(got, id);
            assert_eq!(owner, 2);
        }
        other => panic!("expected NotAuthorized, got {:?}", other),
    }
    assert!(matches!(
        edit_schedule(&mut conn, 999, 1, &edit),
        Err(ScheduleError::NotFound(999))
    ));
    assert_eq!(store::get(&conn, id).unwrap().unwrap().amount, Decimal::new(4500, 2));
}

#[test]
fn delete_keeps_occurrences() {
    let mut conn = setup();
    let id = gym(&mut conn);

    assert!(matches!(
        delete_schedule(&mut conn, id, 7),
        Err(ScheduleError::NotAuthorized { .. })
    ));
    delete_schedule(&mut conn, id, 1).unwrap();

    assert!(list_schedules(&conn, 1).unwrap().is_empty());
    let rows = list_occurrences(&conn, 1, None).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.schedule_id == Some(id)));
    assert!(matches!(
        delete_schedule(&mut conn, id, 1),
        Err(ScheduleError::NotFound(_))
    ));
    assert_eq!(tick(&mut conn, d("2025-01-01")).unwrap().due, 0);
}

#[test]
fn list_is_scoped_to_owner() {
    let mut conn = setup();
    gym(&mut conn);
    let other = NewSchedule {
        owner_id: 2,
        kind: ScheduleKind::Income,
        amount: Decimal::new(300, 0),
        description: "Tutoring".into(),
        category: "Side job".into(),
        frequency: Frequency::Annually,
        start_date: d("2024-09-01"),
        end_date: None,
    };
    create_schedule(&mut conn, &other, d("2024-03-10")).unwrap();

    let mine = list_schedules(&conn, 1).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].description, "Gym");
    let theirs = list_schedules(&conn, 2).unwrap();
    assert_eq!(theirs[0].next_occurrence, d("2024-09-01"));
    assert!(list_occurrences(&conn, 2, None).unwrap().is_empty());
}
