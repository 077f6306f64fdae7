// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine;
use crate::frequency::Frequency;
use crate::models::{NewSchedule, ScheduleEdit, ScheduleKind};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use crate::worker::local_today;
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, owner_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, owner_id, sub)?,
        Some(("edit", sub)) => edit(conn, owner_id, sub)?,
        Some(("rm", sub)) => rm(conn, owner_id, sub)?,
        Some(("list", sub)) => list(conn, owner_id, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn today_from(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("today") {
        Some(s) => parse_date(s),
        None => Ok(local_today()),
    }
}

fn opt_date(sub: &clap::ArgMatches, id: &str) -> Result<Option<NaiveDate>> {
    sub.get_one::<String>(id).map(|s| parse_date(s)).transpose()
}

fn opt_frequency(sub: &clap::ArgMatches) -> Result<Option<Frequency>> {
    Ok(sub
        .get_one::<String>("frequency")
        .map(|s| s.parse::<Frequency>())
        .transpose()?)
}

pub fn new_schedule_from(owner_id: i64, sub: &clap::ArgMatches) -> Result<NewSchedule> {
    let kind = sub
        .get_one::<String>("kind")
        .unwrap()
        .parse::<ScheduleKind>()
        .map_err(|e| anyhow!(e))?;
    let frequency = opt_frequency(sub)?.ok_or_else(|| anyhow!("--frequency is required"))?;
    Ok(NewSchedule {
        owner_id,
        kind,
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        description: sub.get_one::<String>("description").unwrap().trim().to_string(),
        category: sub.get_one::<String>("category").unwrap().trim().to_string(),
        frequency,
        start_date: parse_date(sub.get_one::<String>("start").unwrap())?,
        end_date: opt_date(sub, "end")?,
    })
}

fn add(conn: &mut Connection, owner_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let new = new_schedule_from(owner_id, sub)?;
    let today = today_from(sub)?;
    let (id, backfilled) = engine::create_schedule(conn, &new, today)?;
    println!(
        "Scheduled {} '{}' {} {} from {} (id {}, {} back-filled)",
        new.kind,
        new.description,
        fmt_money(&new.amount),
        new.frequency,
        new.start_date,
        id,
        backfilled
    );
    Ok(())
}

pub fn edit_from(sub: &clap::ArgMatches) -> Result<ScheduleEdit> {
    let end_date = if sub.get_flag("clear-end") {
        Some(None)
    } else {
        opt_date(sub, "end")?.map(Some)
    };
    Ok(ScheduleEdit {
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_decimal(s))
            .transpose()?,
        description: sub.get_one::<String>("description").map(|s| s.trim().to_string()),
        category: sub.get_one::<String>("category").map(|s| s.trim().to_string()),
        frequency: opt_frequency(sub)?,
        start_date: opt_date(sub, "start")?,
        end_date,
    })
}

fn edit(conn: &mut Connection, owner_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let changes = edit_from(sub)?;
    let s = engine::edit_schedule(conn, id, owner_id, &changes)?;
    println!("Updated schedule {} (next due {})", s.id, s.next_occurrence);
    Ok(())
}

fn rm(conn: &mut Connection, owner_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    engine::delete_schedule(conn, id, owner_id)?;
    println!("Removed schedule {}", id);
    Ok(())
}

fn list(conn: &Connection, owner_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let data = engine::list_schedules(conn, owner_id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|s| {
                vec![
                    s.id.to_string(),
                    s.kind.to_string(),
                    s.description.clone(),
                    s.category.clone(),
                    fmt_money(&s.amount),
                    s.frequency.to_string(),
                    s.start_date.to_string(),
                    s.end_date.map(|d| d.to_string()).unwrap_or_default(),
                    s.next_occurrence.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "ID", "Kind", "Description", "Category", "Amount", "Frequency", "Start", "End",
                    "Next",
                ],
                rows,
            )
        );
    }
    Ok(())
}
