// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Periodic tick task.
//!
//! Ticks never overlap: each one runs to completion on the blocking pool
//! before the loop waits for the next interval. The cancellation token is
//! only observed between ticks, including between catch-up rounds.

use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::WorkerConfig;
use crate::engine::{self, TickReport};
use crate::error::{ScheduleError, ScheduleResult};

/// Source of "today" for each tick.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerSummary {
    pub ticks: usize,
    pub failed_ticks: usize,
    pub totals: TickReport,
}

pub struct TickWorker {
    conn: Arc<Mutex<Connection>>,
    config: WorkerConfig,
    clock: Clock,
}

impl TickWorker {
    pub fn new(conn: Arc<Mutex<Connection>>, config: WorkerConfig) -> Self {
        Self {
            conn,
            config,
            clock: Arc::new(local_today),
        }
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    async fn on_blocking_pool<F>(&self, f: F) -> ScheduleResult<TickReport>
    where
        F: FnOnce(&mut Connection, NaiveDate) -> ScheduleResult<TickReport> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let now = (self.clock)();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| ScheduleError::Worker("connection lock poisoned".to_string()))?;
            f(&mut *guard, now)
        })
        .await
        .map_err(|e| ScheduleError::Worker(e.to_string()))?
    }

    /// Run a single tick against the current clock.
    pub async fn run_once(&self) -> ScheduleResult<TickReport> {
        self.on_blocking_pool(engine::tick).await
    }

    /// Tick until a round realizes nothing, `max_catch_up_rounds` is reached or
    /// `token` is cancelled. The token is checked between rounds only.
    async fn catch_up(&self, token: &CancellationToken) -> ScheduleResult<TickReport> {
        let mut total = TickReport::default();
        for round in 0..self.config.max_catch_up_rounds {
            if token.is_cancelled() {
                info!(round, realized = total.realized, "Catch-up interrupted");
                return Ok(total);
            }
            let report = self.run_once().await?;
            total.merge(report);
            if report.realized == 0 {
                return Ok(total);
            }
            debug!(round, realized = report.realized, "Catch-up round");
        }
        warn!(
            max_rounds = self.config.max_catch_up_rounds,
            "Catch-up stopped before all schedules were current"
        );
        Ok(total)
    }

    /// Tick on the configured interval until `token` is cancelled.
    ///
    /// A failed tick is logged and retried on the next interval; it never ends
    /// the loop.
    pub async fn run(self, token: CancellationToken) -> WorkerSummary {
        let mut summary = WorkerSummary::default();
        info!(
            interval_secs = self.config.tick_interval_secs,
            catch_up = self.config.catch_up_on_start,
            "Tick worker started"
        );

        if self.config.catch_up_on_start {
            match self.catch_up(&token).await {
                Ok(report) => {
                    info!(realized = report.realized, failed = report.failed, "Catch-up complete");
                    summary.totals.merge(report);
                }
                Err(e) => error!(error = %e, "Catch-up failed"),
            }
        }

        let mut interval = tokio::time::interval(self.config.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => {}
            }

            summary.ticks += 1;
            match self.run_once().await {
                Ok(report) => {
                    info!(
                        due = report.due,
                        realized = report.realized,
                        skipped = report.skipped,
                        failed = report.failed,
                        "Tick complete"
                    );
                    summary.totals.merge(report);
                }
                Err(e) => {
                    summary.failed_ticks += 1;
                    error!(error = %e, "Tick failed, retrying next interval");
                }
            }
        }

        info!(ticks = summary.ticks, realized = summary.totals.realized, "Tick worker stopped");
        summary
    }
}
