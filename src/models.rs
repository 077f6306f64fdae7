// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::frequency::Frequency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    Income,
    Expense,
}

impl ScheduleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleKind::Income => "income",
            ScheduleKind::Expense => "expense",
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(ScheduleKind::Income),
            "expense" => Ok(ScheduleKind::Expense),
            other => Err(format!("Invalid kind '{}', expected income or expense", other)),
        }
    }
}

/// A stored recurring definition and its cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSchedule {
    pub id: i64,
    pub owner_id: i64,
    pub kind: ScheduleKind,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>, // inclusive
    pub next_occurrence: NaiveDate,
}

/// Input to `engine::create_schedule`.
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub owner_id: i64,
    pub kind: ScheduleKind,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Fields to change on an existing schedule; `None` leaves a field as is.
/// `end_date: Some(None)` clears the end date.
#[derive(Debug, Clone, Default)]
pub struct ScheduleEdit {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
}

/// A realized ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub owner_id: i64,
    pub kind: ScheduleKind,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    pub schedule_id: Option<i64>,
}

impl Occurrence {
    pub fn from_schedule(s: &RecurringSchedule, date: NaiveDate) -> Self {
        Occurrence {
            owner_id: s.owner_id,
            kind: s.kind,
            amount: s.amount,
            description: s.description.clone(),
            category: s.category.clone(),
            date,
            schedule_id: Some(s.id),
        }
    }
}
