// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// Data problems that would skew stats, as `[issue, detail]` rows.
pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Budgets the stats engine will reject
    let mut stmt = conn.prepare("SELECT id, total_budget FROM projects ORDER BY id")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let raw: String = r.get(1)?;
        let finite = raw.trim().parse::<f64>().map(f64::is_finite).unwrap_or(false);
        if !finite {
            rows.push(vec!["invalid_budget".into(), format!("project #{} '{}'", id, raw)]);
        }
    }

    // 2) Windows that collapse to zero length
    let mut stmt2 =
        conn.prepare("SELECT id, start_date, deadline FROM projects WHERE deadline < start_date")?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        let start: String = r.get(1)?;
        let deadline: String = r.get(2)?;
        rows.push(vec![
            "deadline_before_start".into(),
            format!("project #{} {} > {}", id, start, deadline),
        ]);
    }

    // 3) Rows still relying on the single receipt column
    let mut stmt3 = conn.prepare(
        "SELECT id FROM transactions WHERE receipt_url IS NOT NULL AND receipt_url != '' AND receipt_urls IS NULL",
    )?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let id: i64 = r.get(0)?;
        rows.push(vec!["legacy_receipt".into(), format!("transaction #{}", id)]);
    }

    // 4) Amounts that are not positive decimals
    let mut stmt4 = conn.prepare("SELECT id, amount FROM transactions ORDER BY id")?;
    let mut cur4 = stmt4.query([])?;
    while let Some(r) = cur4.next()? {
        let id: i64 = r.get(0)?;
        let raw: String = r.get(1)?;
        let ok = raw
            .trim()
            .parse::<rust_decimal::Decimal>()
            .map(|d| d > rust_decimal::Decimal::ZERO)
            .unwrap_or(false);
        if !ok {
            rows.push(vec!["bad_amount".into(), format!("transaction #{} '{}'", id, raw)]);
        }
    }

    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        tracing::warn!(issues = rows.len(), "doctor found data issues");
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
