// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar stepping for recurring schedules.
//!
//! Every date a schedule produces comes out of [`step`]; back-fill and tick
//! both walk the calendar through it.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Serialized with the same tokens as the `frequency` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Monthly,
    #[serde(rename = "Bi-monthly")]
    BiMonthly,
    Quarterly,
    #[serde(rename = "Semi-annually")]
    SemiAnnually,
    Annually,
}

/// Unit and size of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Days(u64),
    Months(u32),
}

/// Frequency -> (token, step). Tokens match what the entry forms have always
/// stored in the `frequency` column.
const TABLE: [(Frequency, &str, Step); 6] = [
    (Frequency::Daily, "Daily", Step::Days(1)),
    (Frequency::Monthly, "Monthly", Step::Months(1)),
    (Frequency::BiMonthly, "Bi-monthly", Step::Months(2)),
    (Frequency::Quarterly, "Quarterly", Step::Months(3)),
    (Frequency::SemiAnnually, "Semi-annually", Step::Months(6)),
    (Frequency::Annually, "Annually", Step::Months(12)),
];

impl Frequency {
    pub const ALL: [Frequency; 6] = [
        Frequency::Daily,
        Frequency::Monthly,
        Frequency::BiMonthly,
        Frequency::Quarterly,
        Frequency::SemiAnnually,
        Frequency::Annually,
    ];

    // TABLE rows are in declaration order.
    fn entry(self) -> &'static (Frequency, &'static str, Step) {
        &TABLE[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        self.entry().1
    }

    pub fn step_unit(self) -> Step {
        self.entry().2
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ScheduleError;

    /// Accepts the stored tokens case-insensitively, ignoring `-`, `_` and
    /// spaces, so `bi-monthly`, `BiMonthly` and `bi_monthly` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = |t: &str| -> String {
            t.chars()
                .filter(|c| !matches!(c, '-' | '_' | ' '))
                .flat_map(char::to_lowercase)
                .collect()
        };
        let wanted = norm(s.trim());
        TABLE
            .iter()
            .find(|(_, token, _)| norm(token) == wanted)
            .map(|(f, _, _)| *f)
            .ok_or_else(|| ScheduleError::InvalidFrequency(s.trim().to_string()))
    }
}

/// Advance `date` by one period of `frequency`.
///
/// Month-based steps add whole calendar months and clamp to the last day of
/// the target month when the day does not exist there (Jan 31 -> Feb 29 in a
/// leap year). Returns `None` only past the end of chrono's date range.
pub fn step(date: NaiveDate, frequency: Frequency) -> Option<NaiveDate> {
    match frequency.step_unit() {
        Step::Days(n) => date.checked_add_days(Days::new(n)),
        Step::Months(n) => date.checked_add_months(Months::new(n)),
    }
}
