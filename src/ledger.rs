// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The transaction ledger. The engine only ever appends here.

use rusqlite::{Connection, Row, params};
use serde::Serialize;

use crate::error::ScheduleResult;
use crate::models::Occurrence;

pub fn append_occurrence(conn: &Connection, occ: &Occurrence) -> ScheduleResult<i64> {
    conn.execute(
        "INSERT INTO transactions(owner_id, kind, date, amount, description, category, schedule_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            occ.owner_id,
            occ.kind.as_str(),
            occ.date.to_string(),
            occ.amount.to_string(),
            occ.description,
            occ.category,
            occ.schedule_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub amount: String,
    pub description: String,
    pub category: String,
    pub schedule_id: Option<i64>,
}

fn occurrence_row(r: &Row<'_>) -> rusqlite::Result<OccurrenceRow> {
    Ok(OccurrenceRow {
        id: r.get(0)?,
        date: r.get(1)?,
        kind: r.get(2)?,
        amount: r.get(3)?,
        description: r.get(4)?,
        category: r.get(5)?,
        schedule_id: r.get(6)?,
    })
}

/// Ledger rows for `owner_id`, newest first, optionally limited to a `YYYY-MM` month.
pub fn list_occurrences(
    conn: &Connection,
    owner_id: i64,
    month: Option<&str>,
) -> ScheduleResult<Vec<OccurrenceRow>> {
    let mut sql = String::from(
        "SELECT id, date, kind, amount, description, category, schedule_id
         FROM transactions WHERE owner_id=?1",
    );
    if month.is_some() {
        sql.push_str(" AND substr(date,1,7)=?2");
    }
    sql.push_str(" ORDER BY date DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = match month {
        Some(m) => stmt.query_map(params![owner_id, m], occurrence_row)?,
        None => stmt.query_map(params![owner_id], occurrence_row)?,
    };
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
