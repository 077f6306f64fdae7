// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Schedule lifecycle and materialization.
//!
//! Invariant kept by every operation here: once a schedule has been created
//! or advanced, its `next_occurrence` is strictly after the `now` it was
//! computed against, so the same date is never materialized twice.

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ScheduleError, ScheduleResult};
use crate::frequency::{Frequency, step};
use crate::ledger;
use crate::models::{NewSchedule, Occurrence, RecurringSchedule, ScheduleEdit};
use crate::store;

fn check_range(start: NaiveDate, end: Option<NaiveDate>) -> ScheduleResult<()> {
    match end {
        Some(end) if end < start => Err(ScheduleError::InvalidRange { start, end }),
        _ => Ok(()),
    }
}

fn next_date(date: NaiveDate, frequency: Frequency) -> ScheduleResult<NaiveDate> {
    step(date, frequency).ok_or(ScheduleError::DateOverflow(date))
}

/// Dates to back-fill and the first cursor for a schedule defined at `now`.
///
/// Walks the step sequence from `start_date`. When the start is in the past,
/// every stepped date up to and including `now` (and not after `end_date`) is
/// back-filled. The cursor is the first stepped date after `now`.
pub fn plan_backfill(
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    frequency: Frequency,
    now: NaiveDate,
) -> ScheduleResult<(Vec<NaiveDate>, NaiveDate)> {
    let backfill_enabled = start_date < now;
    let mut dates = Vec::new();
    let mut date = start_date;
    while date <= now {
        if backfill_enabled && end_date.is_none_or(|end| date <= end) {
            dates.push(date);
        }
        date = next_date(date, frequency)?;
    }
    Ok((dates, date))
}

/// Persist a new schedule and back-fill its past occurrences in one
/// transaction. Returns the new schedule id and the number of occurrences
/// back-filled.
pub fn create_schedule(
    conn: &mut Connection,
    new: &NewSchedule,
    now: NaiveDate,
) -> ScheduleResult<(i64, usize)> {
    check_range(new.start_date, new.end_date)?;
    let (backfill, cursor) = plan_backfill(new.start_date, new.end_date, new.frequency, now)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let id = store::create(&tx, new, cursor)?;
    for date in &backfill {
        let occ = Occurrence {
            owner_id: new.owner_id,
            kind: new.kind,
            amount: new.amount,
            description: new.description.clone(),
            category: new.category.clone(),
            date: *date,
            schedule_id: Some(id),
        };
        ledger::append_occurrence(&tx, &occ)?;
    }
    tx.commit()?;

    info!(
        schedule_id = id,
        owner_id = new.owner_id,
        frequency = %new.frequency,
        backfilled = backfill.len(),
        next_occurrence = %cursor,
        "Created recurring schedule"
    );
    Ok((id, backfill.len()))
}

fn owned(conn: &Connection, id: i64, owner_id: i64) -> ScheduleResult<RecurringSchedule> {
    let s = store::get(conn, id)?.ok_or(ScheduleError::NotFound(id))?;
    if s.owner_id != owner_id {
        return Err(ScheduleError::NotAuthorized { id, owner: owner_id });
    }
    Ok(s)
}

/// Apply `edit` to schedule `id` on behalf of `owner_id`.
///
/// The cursor only moves when the new start date lies beyond it; past
/// occurrences are never touched.
pub fn edit_schedule(
    conn: &mut Connection,
    id: i64,
    owner_id: i64,
    edit: &ScheduleEdit,
) -> ScheduleResult<RecurringSchedule> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut s = owned(&tx, id, owner_id)?;

    let start_date = edit.start_date.unwrap_or(s.start_date);
    let end_date = edit.end_date.unwrap_or(s.end_date);
    check_range(start_date, end_date)?;

    if let Some(amount) = edit.amount {
        s.amount = amount;
    }
    if let Some(description) = &edit.description {
        s.description = description.clone();
    }
    if let Some(category) = &edit.category {
        s.category = category.clone();
    }
    if let Some(frequency) = edit.frequency {
        s.frequency = frequency;
    }
    s.start_date = start_date;
    s.end_date = end_date;
    if start_date > s.next_occurrence {
        debug!(
            schedule_id = id,
            from = %s.next_occurrence,
            to = %start_date,
            "Cursor moved to new start date"
        );
        s.next_occurrence = start_date;
    }

    store::save(&tx, &s)?;
    tx.commit()?;
    info!(schedule_id = id, next_occurrence = %s.next_occurrence, "Updated recurring schedule");
    Ok(s)
}

/// Remove schedule `id`. Ledger rows it produced stay.
pub fn delete_schedule(conn: &mut Connection, id: i64, owner_id: i64) -> ScheduleResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    owned(&tx, id, owner_id)?;
    store::delete(&tx, id)?;
    tx.commit()?;
    info!(schedule_id = id, "Deleted recurring schedule");
    Ok(())
}

pub fn list_schedules(
    conn: &Connection,
    owner_id: i64,
) -> ScheduleResult<Vec<RecurringSchedule>> {
    store::list_for_owner(conn, owner_id)
}

/// Outcome of one or more ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Schedules found due.
    pub due: usize,
    /// Occurrences written.
    pub realized: usize,
    /// Due schedules whose cursor had already moved when we tried to advance it.
    pub skipped: usize,
    pub failed: usize,
}

impl TickReport {
    pub fn merge(&mut self, other: TickReport) {
        self.due += other.due;
        self.realized += other.realized;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Materialize the occurrence at the schedule's cursor and advance the cursor
/// one step. Returns false if the cursor was no longer where `s` says it is.
fn realize(conn: &mut Connection, s: &RecurringSchedule) -> ScheduleResult<bool> {
    let date = s.next_occurrence;
    let next = next_date(date, s.frequency)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if !store::advance_cursor(&tx, s.id, date, next)? {
        return Ok(false);
    }
    ledger::append_occurrence(&tx, &Occurrence::from_schedule(s, date))?;
    tx.commit()?;
    debug!(schedule_id = s.id, date = %date, next_occurrence = %next, "Realized occurrence");
    Ok(true)
}

/// Realize at most one occurrence per due schedule.
///
/// A schedule that is several periods behind moves one period per call; use
/// [`catch_up`] to drain it. Each schedule commits independently, so a storage
/// failure on one leaves it untouched (and retried next tick) without holding
/// back the others.
pub fn tick(conn: &mut Connection, now: NaiveDate) -> ScheduleResult<TickReport> {
    let due = store::load_due(conn, now)?;
    let mut report = TickReport {
        due: due.len(),
        ..TickReport::default()
    };
    for s in &due {
        match realize(conn, s) {
            Ok(true) => report.realized += 1,
            Ok(false) => {
                debug!(schedule_id = s.id, "Cursor already advanced, skipping");
                report.skipped += 1;
            }
            Err(e) => {
                warn!(schedule_id = s.id, error = %e, "Failed to realize occurrence");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

/// Tick repeatedly until a round realizes nothing or `max_rounds` is reached.
pub fn catch_up(
    conn: &mut Connection,
    now: NaiveDate,
    max_rounds: usize,
) -> ScheduleResult<TickReport> {
    let mut total = TickReport::default();
    for round in 0..max_rounds {
        let report = tick(conn, now)?;
        total.merge(report);
        if report.realized == 0 {
            return Ok(total);
        }
        debug!(round, realized = report.realized, "Catch-up round");
    }
    warn!(max_rounds, "Catch-up stopped before all schedules were current");
    Ok(total)
}
