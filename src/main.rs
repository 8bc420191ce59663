// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use grantburn::{cli, commands, config::AppConfig, db, utils};

fn main() -> Result<()> {
    utils::init_tracing();
    let matches = cli::build_cli().get_matches();

    let cfg = AppConfig::from_env()?;
    let conn = db::open_or_init(&cfg.db_path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", cfg.db_path.display());
        }
        Some(("currency", sub)) => {
            let ccy = utils::required(sub, "code")?.trim().to_uppercase();
            utils::set_currency(&conn, &ccy)?;
            println!("Display currency set to {}", ccy);
        }
        Some(("project", sub)) => commands::projects::handle(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("assistant", sub)) => commands::assistant::handle(&conn, &cfg.assistant, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
