// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cadence::config::WorkerConfig;
use cadence::engine::create_schedule;
use cadence::frequency::Frequency;
use cadence::models::{NewSchedule, ScheduleKind};
use cadence::worker::TickWorker;
use cadence::db;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Daily schedule defined on 2024-03-01, first due 2024-03-02.
fn setup() -> Arc<Mutex<Connection>> {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let new = NewSchedule {
        owner_id: 1,
        kind: ScheduleKind::Expense,
        amount: Decimal::new(350, 2),
        description: "Coffee".into(),
        category: "Food".into(),
        frequency: Frequency::Daily,
        start_date: d("2024-03-01"),
        end_date: None,
    };
    create_schedule(&mut conn, &new, d("2024-03-01")).unwrap();
    Arc::new(Mutex::new(conn))
}

fn ledger_count(conn: &Arc<Mutex<Connection>>) -> i64 {
    conn.lock()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap_or(-1)
}

async fn wait_for_count(conn: &Arc<Mutex<Connection>>, n: i64) {
    for _ in 0..250 {
        if ledger_count(conn) == n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("ledger never reached {} rows", n);
}

fn config(secs: u64) -> WorkerConfig {
    WorkerConfig {
        tick_interval_secs: secs,
        ..WorkerConfig::default()
    }
}

#[tokio::test]
async fn first_tick_runs_immediately_and_repeats_are_noops() {
    let conn = setup();
    let token = CancellationToken::new();
    let worker = TickWorker::new(Arc::clone(&conn), config(1)).with_clock(|| d("2024-03-02"));
    let handle = tokio::spawn(worker.run(token.clone()));

    wait_for_count(&conn, 1).await;
    // let at least one more tick pass against the same date
    tokio::time::sleep(Duration::from_millis(1200)).await;
    token.cancel();
    let summary = handle.await.unwrap();

    assert!(summary.ticks >= 2);
    assert_eq!(summary.totals.realized, 1);
    assert_eq!(summary.failed_ticks, 0);
    assert_eq!(ledger_count(&conn), 1);
}

#[tokio::test]
async fn cancelled_before_start_does_nothing() {
    let conn = setup();
    let token = CancellationToken::new();
    token.cancel();
    let mut cfg = config(1);
    cfg.catch_up_on_start = true;
    let summary = TickWorker::new(Arc::clone(&conn), cfg)
        .with_clock(|| d("2024-03-10"))
        .run(token)
        .await;
    assert_eq!(summary.ticks, 0);
    assert_eq!(summary.totals.realized, 0);
    assert_eq!(ledger_count(&conn), 0);
}

#[tokio::test]
async fn catch_up_on_start_drains_backlog() {
    let conn = setup();
    let token = CancellationToken::new();
    let mut cfg = config(3600);
    cfg.catch_up_on_start = true;
    let worker = TickWorker::new(Arc::clone(&conn), cfg).with_clock(|| d("2024-03-10"));
    let handle = tokio::spawn(worker.run(token.clone()));

    wait_for_count(&conn, 9).await;
    token.cancel();
    let summary = handle.await.unwrap();
    assert_eq!(summary.totals.realized, 9);
    assert_eq!(ledger_count(&conn), 9);
}

#[tokio::test]
async fn cancel_during_catch_up_stops_after_current_round() {
    // nine months behind; without cancellation catch-up would realize ~300
    let conn = setup();
    let token = CancellationToken::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut cfg = config(3600);
    cfg.catch_up_on_start = true;

    let clock_token = token.clone();
    let clock_calls = Arc::clone(&calls);
    let worker = TickWorker::new(Arc::clone(&conn), cfg).with_clock(move || {
        // shutdown arrives while the third round is being scheduled
        if clock_calls.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
            clock_token.cancel();
        }
        d("2024-12-31")
    });
    let summary = tokio::time::timeout(Duration::from_secs(5), worker.run(token))
        .await
        .expect("worker did not stop after cancellation");

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(summary.totals.realized, 3);
    assert_eq!(summary.ticks, 0);
    assert_eq!(ledger_count(&conn), 3);
}

#[tokio::test]
async fn failed_tick_is_logged_and_loop_survives() {
    let conn = setup();
    conn.lock()
        .unwrap()
        .execute_batch("DROP TABLE recurring_schedules;")
        .unwrap();

    let token = CancellationToken::new();
    let worker = TickWorker::new(Arc::clone(&conn), config(1)).with_clock(|| d("2024-03-02"));
    let handle = tokio::spawn(worker.run(token.clone()));
    tokio::time::sleep(Duration::from_millis(1300)).await;
    token.cancel();
    let summary = handle.await.unwrap();

    assert!(summary.failed_ticks >= 2);
    assert_eq!(summary.ticks, summary.failed_ticks);
}

#[tokio::test]
async fn run_once_uses_worker_clock() {
    let conn = setup();
    let worker = TickWorker::new(Arc::clone(&conn), config(60)).with_clock(|| d("2024-03-05"));
    assert_eq!(worker.run_once().await.unwrap().realized, 1);
    assert_eq!(worker.run_once().await.unwrap().realized, 1);
    assert_eq!(worker.run_once().await.unwrap().realized, 1);
    assert_eq!(worker.run_once().await.unwrap().realized, 1);
    assert_eq!(worker.run_once().await.unwrap().realized, 0);
    assert_eq!(ledger_count(&conn), 4);
}
