// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::{Arc, Mutex};

use crate::commands::schedules::today_from;
use crate::config::WorkerConfig;
use crate::engine;
use crate::worker::TickWorker;
use anyhow::{Context, Result};
use rusqlite::Connection;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// One-shot tick from the command line.
pub fn handle(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_from(sub)?;
    let report = if sub.get_flag("catch-up") {
        engine::catch_up(conn, today, WorkerConfig::default().max_catch_up_rounds)?
    } else {
        engine::tick(conn, today)?
    };
    println!(
        "{}: {} due, {} realized, {} skipped, {} failed",
        today, report.due, report.realized, report.skipped, report.failed
    );
    Ok(())
}

/// Run the periodic worker until Ctrl-C.
pub fn run(conn: Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut config = WorkerConfig::resolve(&conn, sub.get_one::<u64>("interval").copied())?;
    config.catch_up_on_start = sub.get_flag("catch-up");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let token = CancellationToken::new();
        let worker = TickWorker::new(Arc::new(Mutex::new(conn)), config);
        let handle = tokio::spawn(worker.run(token.clone()));

        tokio::signal::ctrl_c()
            .await
            .context("Failed to install Ctrl+C handler")?;
        info!("Received Ctrl+C, stopping after the current tick");
        token.cancel();

        let summary = handle.await.context("Tick worker panicked")?;
        println!(
            "Stopped after {} ticks: {} realized, {} failed ticks",
            summary.ticks, summary.totals.realized, summary.failed_ticks
        );
        Ok::<(), anyhow::Error>(())
    })
}
