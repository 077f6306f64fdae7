// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned by schedule operations.
///
/// The validation variants are detected before any write.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("End date {end} precedes start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Unrecognized frequency '{0}'")]
    InvalidFrequency(String),

    #[error("Schedule {id} is not owned by user {owner}")]
    NotAuthorized { id: i64, owner: i64 },

    #[error("Schedule {0} not found")]
    NotFound(i64),

    #[error("Stepping past {0} leaves the supported date range")]
    DateOverflow(NaiveDate),

    #[error("Storage error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("Stored value '{value}' in {column} is invalid")]
    Corrupt { column: &'static str, value: String },

    #[error("Background tick failed: {0}")]
    Worker(String),
}

impl ScheduleError {
    /// True for the failures a caller can fix by changing its input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidRange { .. }
                | ScheduleError::InvalidFrequency(_)
                | ScheduleError::NotAuthorized { .. }
                | ScheduleError::NotFound(_)
        )
    }
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ScheduleError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "End date 2024-04-01 precedes start date 2024-05-01"
        );
        assert!(err.is_validation());

        let err = ScheduleError::NotAuthorized { id: 7, owner: 2 };
        assert!(err.to_string().contains("not owned by user 2"));

        let err = ScheduleError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.to_string().starts_with("Storage error"));
        assert!(!err.is_validation());
    }
}
