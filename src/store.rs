// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistence for `recurring_schedules`.
//!
//! Functions take a plain `&Connection`; pass a `rusqlite::Transaction` (it
//! derefs to one) to group several calls atomically.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{NewSchedule, RecurringSchedule};

const COLUMNS: &str = "id, owner_id, kind, amount, description, category, frequency, \
                       start_date, end_date, next_occurrence";

fn corrupt(column: &'static str, value: String) -> ScheduleError {
    ScheduleError::Corrupt { column, value }
}

fn parse_stored_date(column: &'static str, s: String) -> ScheduleResult<NaiveDate> {
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| corrupt(column, s))
}

struct RawRow {
    id: i64,
    owner_id: i64,
    kind: String,
    amount: String,
    description: String,
    category: String,
    frequency: String,
    start_date: String,
    end_date: Option<String>,
    next_occurrence: String,
}

fn raw(r: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        kind: r.get(2)?,
        amount: r.get(3)?,
        description: r.get(4)?,
        category: r.get(5)?,
        frequency: r.get(6)?,
        start_date: r.get(7)?,
        end_date: r.get(8)?,
        next_occurrence: r.get(9)?,
    })
}

impl TryFrom<RawRow> for RecurringSchedule {
    type Error = ScheduleError;

    fn try_from(r: RawRow) -> ScheduleResult<Self> {
        let kind = r.kind.parse().map_err(|_| corrupt("kind", r.kind.clone()))?;
        let amount = r
            .amount
            .parse::<Decimal>()
            .map_err(|_| corrupt("amount", r.amount.clone()))?;
        let frequency = r
            .frequency
            .parse()
            .map_err(|_| corrupt("frequency", r.frequency.clone()))?;
        let end_date = r
            .end_date
            .map(|s| parse_stored_date("end_date", s))
            .transpose()?;
        Ok(RecurringSchedule {
            id: r.id,
            owner_id: r.owner_id,
            kind,
            amount,
            description: r.description,
            category: r.category,
            frequency,
            start_date: parse_stored_date("start_date", r.start_date)?,
            end_date,
            next_occurrence: parse_stored_date("next_occurrence", r.next_occurrence)?,
        })
    }
}

fn collect(
    conn: &Connection,
    sql: &str,
    args: impl rusqlite::Params,
) -> ScheduleResult<Vec<RecurringSchedule>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, raw)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(RecurringSchedule::try_from(row?)?);
    }
    Ok(out)
}

/// Insert a schedule row with the given initial cursor and return its id.
pub fn create(
    conn: &Connection,
    s: &NewSchedule,
    next_occurrence: NaiveDate,
) -> ScheduleResult<i64> {
    conn.execute(
        "INSERT INTO recurring_schedules
            (owner_id, kind, amount, description, category, frequency, start_date, end_date, next_occurrence)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            s.owner_id,
            s.kind.as_str(),
            s.amount.to_string(),
            s.description,
            s.category,
            s.frequency.as_str(),
            s.start_date.to_string(),
            s.end_date.map(|d| d.to_string()),
            next_occurrence.to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> ScheduleResult<Option<RecurringSchedule>> {
    let sql = format!("SELECT {} FROM recurring_schedules WHERE id=?1", COLUMNS);
    let row = conn.query_row(&sql, params![id], raw).optional()?;
    row.map(RecurringSchedule::try_from).transpose()
}

/// Schedules whose cursor has reached `now` and whose end date (if any) still
/// covers the cursor.
pub fn load_due(conn: &Connection, now: NaiveDate) -> ScheduleResult<Vec<RecurringSchedule>> {
    let sql = format!(
        "SELECT {} FROM recurring_schedules
         WHERE next_occurrence <= ?1
           AND (end_date IS NULL OR end_date >= next_occurrence)
         ORDER BY next_occurrence, id",
        COLUMNS
    );
    collect(conn, &sql, params![now.to_string()])
}

pub fn list_for_owner(
    conn: &Connection,
    owner_id: i64,
) -> ScheduleResult<Vec<RecurringSchedule>> {
    let sql = format!(
        "SELECT {} FROM recurring_schedules WHERE owner_id=?1 ORDER BY next_occurrence, id",
        COLUMNS
    );
    collect(conn, &sql, params![owner_id])
}

/// Move the cursor from `expected` to `next`. Returns false when the stored
/// cursor is no longer `expected` (another tick got there first).
pub fn advance_cursor(
    conn: &Connection,
    id: i64,
    expected: NaiveDate,
    next: NaiveDate,
) -> ScheduleResult<bool> {
    let n = conn.execute(
        "UPDATE recurring_schedules SET next_occurrence=?1 WHERE id=?2 AND next_occurrence=?3",
        params![next.to_string(), id, expected.to_string()],
    )?;
    Ok(n == 1)
}

/// Write every mutable field of `s` back to its row.
pub fn save(conn: &Connection, s: &RecurringSchedule) -> ScheduleResult<()> {
    let n = conn.execute(
        "UPDATE recurring_schedules
         SET amount=?1, description=?2, category=?3, frequency=?4,
             start_date=?5, end_date=?6, next_occurrence=?7
         WHERE id=?8",
        params![
            s.amount.to_string(),
            s.description,
            s.category,
            s.frequency.as_str(),
            s.start_date.to_string(),
            s.end_date.map(|d| d.to_string()),
            s.next_occurrence.to_string(),
            s.id,
        ],
    )?;
    if n == 0 {
        return Err(ScheduleError::NotFound(s.id));
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> ScheduleResult<()> {
    let n = conn.execute("DELETE FROM recurring_schedules WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(ScheduleError::NotFound(id));
    }
    Ok(())
}
