// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result};

use cadence::{cli, commands, db};

fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(commands::exit_status(&e));
    }
}

fn run() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    init_logging(matches.get_one::<String>("log-level").unwrap())?;

    let db_override = matches.get_one::<String>("db").map(Path::new);
    let owner = *matches.get_one::<i64>("owner").unwrap();
    let mut conn = db::open_or_init(db_override)?;

    match matches.subcommand() {
        Some(("init", _)) => match db_override {
            Some(p) => println!("Database initialized at {}", p.display()),
            None => println!("Database initialized at {}", db::db_path()?.display()),
        },
        Some(("schedule", sub)) => commands::schedules::handle(&mut conn, owner, sub)?,
        Some(("tick", sub)) => commands::tick::handle(&mut conn, sub)?,
        Some(("run", sub)) => commands::tick::run(conn, sub)?,
        Some(("ledger", sub)) => commands::occurrences::handle(&conn, owner, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
