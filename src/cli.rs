// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, ArgGroup, Command, command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn today_arg() -> Arg {
    Arg::new("today")
        .long("today")
        .value_name("YYYY-MM-DD")
        .help("Treat this date as today (defaults to the local date)")
}

fn frequency_help() -> &'static str {
    "Daily, Monthly, Bi-monthly, Quarterly, Semi-annually or Annually"
}

fn schedule_cmd() -> Command {
    Command::new("schedule")
        .about("Recurring income and expense schedules")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Define a schedule, back-filling occurrences already due")
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .required(true)
                        .value_parser(["income", "expense"]),
                )
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("description").long("description").required(true))
                .arg(
                    Arg::new("category")
                        .long("category")
                        .required(true)
                        .help("Expense category or income source"),
                )
                .arg(
                    Arg::new("frequency")
                        .long("frequency")
                        .required(true)
                        .help(frequency_help()),
                )
                .arg(Arg::new("start").long("start").required(true).value_name("YYYY-MM-DD"))
                .arg(Arg::new("end").long("end").value_name("YYYY-MM-DD"))
                .arg(today_arg()),
        )
        .subcommand(
            Command::new("edit")
                .about("Change a schedule without touching past occurrences")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("frequency").long("frequency").help(frequency_help()))
                .arg(Arg::new("start").long("start").value_name("YYYY-MM-DD"))
                .arg(Arg::new("end").long("end").value_name("YYYY-MM-DD"))
                .arg(
                    Arg::new("clear-end")
                        .long("clear-end")
                        .action(ArgAction::SetTrue)
                        .help("Remove the end date"),
                )
                .group(ArgGroup::new("end-change").args(["end", "clear-end"])),
        )
        .subcommand(
            Command::new("rm").about("Delete a schedule (its occurrences stay)").arg(
                Arg::new("id")
                    .long("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
        .subcommand(json_flags(Command::new("list").about("List schedules")))
}

pub fn build_cli() -> Command {
    command!()
        .name("cadence")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .help("SQLite database file (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("owner")
                .long("owner")
                .global(true)
                .default_value("1")
                .value_parser(value_parser!(i64))
                .help("User id the command acts for"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("info")
                .help("Log filter used when RUST_LOG is unset"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(schedule_cmd())
        .subcommand(
            Command::new("tick")
                .about("Realize occurrences that are due")
                .arg(today_arg())
                .arg(
                    Arg::new("catch-up")
                        .long("catch-up")
                        .action(ArgAction::SetTrue)
                        .help("Repeat until no schedule is behind"),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Tick periodically until interrupted")
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .value_name("SECS")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("catch-up")
                        .long("catch-up")
                        .action(ArgAction::SetTrue)
                        .help("Drain overdue schedules before the first interval"),
                ),
        )
        .subcommand(
            Command::new("ledger")
                .about("Realized occurrences")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("list").arg(Arg::new("month").long("month").value_name("YYYY-MM")),
                )),
        )
        .subcommand(
            Command::new("config")
                .about("Stored settings")
                .subcommand_required(true)
                .subcommand(
                    Command::new("get")
                        .arg(Arg::new("key").required(true).value_parser(["interval"])),
                )
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true).value_parser(["interval"]))
                        .arg(
                            Arg::new("value")
                                .required(true)
                                .value_parser(value_parser!(u64)),
                        ),
                ),
        )
}
