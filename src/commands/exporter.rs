// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::projects::load_project;
use crate::commands::transactions::{TxFilter, load_transactions};
use crate::utils::required;
use anyhow::{Result, anyhow};
use chrono::SecondsFormat;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("project", sub)) => export_project(conn, sub),
        _ => Ok(()),
    }
}

fn export_project(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub
        .get_one::<i64>("id")
        .copied()
        .ok_or_else(|| anyhow!("Missing project id"))?;
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;

    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }

    let project = load_project(conn, id)?;
    let txs = load_transactions(
        conn,
        &TxFilter {
            project_id: Some(id),
            ascending: true,
            ..TxFilter::default()
        },
    )?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "amount", "vendor", "category", "status", "receipts"])?;
            for tx in &txs {
                wtr.write_record([
                    tx.occurred_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                    tx.amount.to_string(),
                    tx.vendor.clone().unwrap_or_default(),
                    tx.category.clone().unwrap_or_default(),
                    tx.status.to_string(),
                    tx.receipts.join(";"),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = txs
                .iter()
                .map(|tx| {
                    json!({
                        "date": tx.occurred_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                        "amount": tx.amount.to_string(),
                        "vendor": tx.vendor,
                        "category": tx.category,
                        "status": tx.status,
                        "receipts": tx.receipts,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    tracing::info!(project = id, rows = txs.len(), %fmt, "export written");
    println!(
        "Exported {} transaction(s) of '{}' to {}",
        txs.len(),
        project.name,
        out
    );
    Ok(())
}
