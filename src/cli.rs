// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print JSON").required(false))
        .arg(arg!(--jsonl "Print one JSON object per line").required(false))
}

fn as_of() -> Arg {
    Arg::new("as_of")
        .long("as-of")
        .value_name("DATE")
        .help("Evaluate at this date or RFC 3339 instant instead of now")
}

fn project_id() -> Arg {
    arg!(<id> "Project id").value_parser(value_parser!(i64))
}

fn tx_id() -> Arg {
    arg!(<id> "Transaction id").value_parser(value_parser!(i64))
}

fn project_cmd() -> Command {
    Command::new("project")
        .about("Manage projects and their burn statistics")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Create a project")
                .arg(arg!(--name <NAME>).required(true))
                .arg(arg!(--budget <AMOUNT> "Total budget").required(true))
                .arg(arg!(--start <DATE> "Start date YYYY-MM-DD").required(true))
                .arg(arg!(--deadline <DATE> "Deadline YYYY-MM-DD").required(true)),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List projects with burn statistics")
                .arg(arg!(--status <STATUS> "active|completed|archived").required(false))
                .arg(as_of()),
        ))
        .subcommand(
            Command::new("stats")
                .about("Show burn statistics for one project")
                .arg(project_id())
                .arg(as_of())
                .arg(arg!(--json "Print JSON").required(false)),
        )
        .subcommand(
            Command::new("edit")
                .about("Change project fields")
                .arg(project_id())
                .arg(arg!(--name <NAME>).required(false))
                .arg(arg!(--budget <AMOUNT>).required(false))
                .arg(arg!(--start <DATE>).required(false))
                .arg(arg!(--deadline <DATE>).required(false)),
        )
        .subcommand(
            Command::new("status")
                .about("Set project status")
                .arg(project_id())
                .arg(arg!(<status> "active|completed|archived")),
        )
        .subcommand(Command::new("rm").about("Delete a project").arg(project_id()))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record an expense")
                .arg(
                    arg!(--project <ID>)
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(arg!(--amount <AMOUNT>).required(true))
                .arg(arg!(--vendor <VENDOR>).required(false))
                .arg(arg!(--category <CATEGORY>).required(false))
                .arg(arg!(--date <WHEN> "YYYY-MM-DD or RFC 3339, defaults to now").required(false))
                .arg(arg!(--note <NOTE>).required(false))
                .arg(arg!(--status <STATUS> "spent|invoiced").required(false))
                .arg(
                    arg!(--receipt <REF> "Receipt reference, repeatable")
                        .required(false)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List transactions, newest first")
                .arg(
                    arg!(--project <ID>)
                        .required(false)
                        .value_parser(value_parser!(i64)),
                )
                .arg(arg!(--category <CATEGORY>).required(false))
                .arg(
                    arg!(--limit <N>)
                        .required(false)
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(json_flags(
            Command::new("search")
                .about("Search vendor and notes")
                .arg(arg!(<query> "Text to look for")),
        ))
        .subcommand(
            Command::new("edit")
                .about("Change transaction fields; empty text clears a field")
                .arg(tx_id())
                .arg(arg!(--amount <AMOUNT>).required(false))
                .arg(arg!(--vendor <VENDOR>).required(false))
                .arg(arg!(--category <CATEGORY>).required(false))
                .arg(arg!(--date <WHEN>).required(false))
                .arg(arg!(--note <NOTE>).required(false))
                .arg(arg!(--status <STATUS>).required(false)),
        )
        .subcommand(
            Command::new("attach")
                .about("Attach receipt references")
                .arg(tx_id())
                .arg(arg!(<refs> ... "Receipt references")),
        )
        .subcommand(
            Command::new("detach")
                .about("Remove a receipt reference")
                .arg(tx_id())
                .arg(Arg::new("ref").required(true).help("Receipt reference")),
        )
        .subcommand(Command::new("rm").about("Delete a transaction").arg(tx_id()))
}

pub fn build_cli() -> Command {
    Command::new("grantburn")
        .about("Track project budgets against their deadlines")
        .version(crate_version!())
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("currency")
                .about("Set the display currency")
                .arg(arg!(<code> "Currency code, e.g. USD")),
        )
        .subcommand(project_cmd())
        .subcommand(tx_cmd())
        .subcommand(
            Command::new("dashboard")
                .about("Spend totals by category and month")
                .arg(as_of())
                .arg(arg!(--json "Print JSON").required(false)),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("project")
                        .about("Export a project's transactions")
                        .arg(project_id())
                        .arg(
                            arg!(--format <FMT> "csv|json")
                                .required(false)
                                .default_value("csv"),
                        )
                        .arg(arg!(--out <PATH>).required(true)),
                ),
        )
        .subcommand(
            Command::new("assistant")
                .about("Financial summary and chat assistant")
                .subcommand_required(true)
                .subcommand(
                    Command::new("summary")
                        .about("Print the summary sent to the assistant")
                        .arg(as_of()),
                )
                .subcommand(
                    Command::new("ask")
                        .about("Ask the assistant a question")
                        .arg(arg!(<question> "Question to ask")),
                ),
        )
        .subcommand(Command::new("doctor").about("Report data problems"))
}
