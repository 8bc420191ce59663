// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::dashboard::{DashboardAggregate, aggregate_dashboard};
use crate::models::SpendRecord;
use crate::utils::{
    flag, fmt_money, get_currency, maybe_print_json, parse_decimal, parse_timestamp,
    pretty_table, resolve_now,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

pub fn load_spend_records(conn: &Connection) -> Result<Vec<SpendRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, amount, category, occurred_at FROM transactions ORDER BY occurred_at DESC",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, amt, category, occurred) = row?;
        out.push(SpendRecord {
            amount: parse_decimal(&amt)
                .with_context(|| format!("Invalid amount '{}' in transaction #{}", amt, id))?,
            category,
            occurred_at: parse_timestamp(&occurred)
                .with_context(|| format!("Invalid occurred_at on transaction #{}", id))?,
        });
    }
    Ok(out)
}

pub fn dashboard_data(conn: &Connection, now: DateTime<Utc>) -> Result<DashboardAggregate> {
    let records = load_spend_records(conn)?;
    tracing::debug!(records = records.len(), %now, "aggregating dashboard");
    Ok(aggregate_dashboard(&records, now))
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let now = resolve_now(m)?;
    let data = dashboard_data(conn, now)?;
    if maybe_print_json(flag(m, "json"), false, &data)? {
        return Ok(());
    }

    let ccy = get_currency(conn)?;
    println!("Total spent: {}", fmt_money(&data.total_spent, &ccy));

    let cats = data
        .category_totals
        .iter()
        .map(|c| vec![c.label.clone(), fmt_money(&c.total, &ccy)])
        .collect();
    println!("{}", pretty_table(&["Category", "Spent"], cats));

    let months = data
        .monthly_series
        .iter()
        .map(|m| vec![m.key.clone(), fmt_money(&m.amount, &ccy)])
        .collect();
    println!("{}", pretty_table(&["Month", "Spent"], months));
    Ok(())
}
