// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Background worker settings.
//!
//! Precedence: command-line flag, then the `settings` table, then defaults.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::utils::{get_setting, set_setting};

pub const TICK_INTERVAL_KEY: &str = "tick_interval_secs";

/// One hour, the cadence the processor has always used.
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 3600;

pub const DEFAULT_CATCH_UP_ROUNDS: usize = 400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub tick_interval_secs: u64,
    /// Drain every overdue schedule once before the periodic loop starts.
    #[serde(default)]
    pub catch_up_on_start: bool,
    #[serde(default = "default_catch_up_rounds")]
    pub max_catch_up_rounds: usize,
}

fn default_catch_up_rounds() -> usize {
    DEFAULT_CATCH_UP_ROUNDS
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            catch_up_on_start: false,
            max_catch_up_rounds: DEFAULT_CATCH_UP_ROUNDS,
        }
    }
}

impl WorkerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    /// Build the config from an optional flag value and the stored setting.
    pub fn resolve(conn: &Connection, interval_flag: Option<u64>) -> Result<Self> {
        let tick_interval_secs = match interval_flag {
            Some(secs) => secs,
            None => stored_interval(conn)?.unwrap_or(DEFAULT_TICK_INTERVAL_SECS),
        };
        validate_interval(tick_interval_secs)?;
        Ok(Self {
            tick_interval_secs,
            ..Self::default()
        })
    }
}

fn validate_interval(secs: u64) -> Result<()> {
    if secs == 0 {
        bail!("Tick interval must be at least 1 second");
    }
    Ok(())
}

pub fn stored_interval(conn: &Connection) -> Result<Option<u64>> {
    get_setting(conn, TICK_INTERVAL_KEY)?
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid {} setting '{}'", TICK_INTERVAL_KEY, v))
        })
        .transpose()
}

pub fn store_interval(conn: &Connection, secs: u64) -> Result<()> {
    validate_interval(secs)?;
    set_setting(conn, TICK_INTERVAL_KEY, &secs.to_string())
}
