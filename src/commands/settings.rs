// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{DEFAULT_TICK_INTERVAL_SECS, store_interval, stored_interval};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", _)) => match stored_interval(conn)? {
            Some(secs) => println!("interval = {}s", secs),
            None => println!("interval = {}s (default)", DEFAULT_TICK_INTERVAL_SECS),
        },
        Some(("set", sub)) => {
            let secs = *sub.get_one::<u64>("value").unwrap();
            store_interval(conn, secs)?;
            println!("interval set to {}s", secs);
        }
        _ => {}
    }
    Ok(())
}
