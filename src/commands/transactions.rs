// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Transaction, TransactionStatus, normalize_receipts};
use crate::utils::{
    flag, fmt_money, get_currency, maybe_print_json, parse_amount, parse_decimal,
    parse_timestamp, pretty_table, required,
};
use anyhow::{Context, Result, anyhow};
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

pub const SEARCH_LIMIT: usize = 50;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(conn, sub)?;
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("search", sub)) => search(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("attach", sub)) => attach(conn, sub)?,
        Some(("detach", sub)) => detach(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn id_arg(sub: &clap::ArgMatches) -> Result<i64> {
    sub.get_one::<i64>("id")
        .copied()
        .ok_or_else(|| anyhow!("Missing transaction id"))
}

fn opt_text(sub: &clap::ArgMatches, id: &str) -> Option<String> {
    sub.get_one::<String>(id)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn receipts_json(receipts: &[String]) -> Result<Option<String>> {
    if receipts.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(receipts)?))
    }
}

pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<i64> {
    let project_id = sub
        .get_one::<i64>("project")
        .copied()
        .ok_or_else(|| anyhow!("Missing --project"))?;
    let amount = parse_amount(required(sub, "amount")?)?;
    let occurred_at = match sub.get_one::<String>("date") {
        Some(s) => parse_timestamp(s)?,
        None => Utc::now(),
    };
    let status = match sub.get_one::<String>("status") {
        Some(s) => s.parse::<TransactionStatus>()?,
        None => TransactionStatus::Spent,
    };
    let vendor = opt_text(sub, "vendor");
    let category = opt_text(sub, "category");
    let note = opt_text(sub, "note");
    let receipts: Vec<String> = sub
        .get_many::<String>("receipt")
        .map(|vals| {
            vals.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let exists: Option<i64> = conn
        .query_row("SELECT id FROM projects WHERE id=?1", params![project_id], |r| {
            r.get(0)
        })
        .optional()?;
    if exists.is_none() {
        return Err(anyhow!("Project #{} not found", project_id));
    }

    conn.execute(
        "INSERT INTO transactions(project_id, amount, vendor, occurred_at, category, status, notes, receipt_urls)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            project_id,
            amount.to_string(),
            vendor,
            occurred_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            category,
            status.as_str(),
            note,
            receipts_json(&receipts)?,
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, project_id, %amount, receipts = receipts.len(), "transaction recorded");
    println!(
        "Recorded {} on {} for project #{}{}",
        amount,
        occurred_at.date_naive(),
        project_id,
        vendor.map(|v| format!(" at '{}'", v)).unwrap_or_default()
    );
    Ok(id)
}

const TX_COLUMNS: &str = "t.id, t.project_id, t.amount, t.vendor, t.occurred_at, t.category, t.status, t.notes, t.receipt_urls, t.receipt_url";

fn transaction_from_row(r: &rusqlite::Row<'_>) -> Result<Transaction> {
    let id: i64 = r.get(0)?;
    let amount_s: String = r.get(2)?;
    let occurred_s: String = r.get(4)?;
    let status_s: String = r.get(6)?;
    let plural: Option<String> = r.get(8)?;
    let singular: Option<String> = r.get(9)?;
    Ok(Transaction {
        id,
        project_id: r.get(1)?,
        amount: parse_decimal(&amount_s)
            .with_context(|| format!("Invalid amount '{}' in transaction #{}", amount_s, id))?,
        vendor: r.get(3)?,
        occurred_at: parse_timestamp(&occurred_s)
            .with_context(|| format!("Invalid occurred_at on transaction #{}", id))?,
        category: r.get(5)?,
        status: status_s.parse()?,
        notes: r.get(7)?,
        receipts: normalize_receipts(plural.as_deref(), singular.as_deref()),
    })
}

#[derive(Debug, Default, Clone)]
pub struct TxFilter {
    pub project_id: Option<i64>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    /// Oldest first instead of newest first.
    pub ascending: bool,
}

pub fn load_transactions(conn: &Connection, filter: &TxFilter) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {} FROM transactions t WHERE 1=1", TX_COLUMNS);
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(pid) = filter.project_id {
        sql.push_str(" AND t.project_id=?");
        params_vec.push(Box::new(pid));
    }
    if let Some(cat) = &filter.category {
        sql.push_str(" AND t.category=?");
        params_vec.push(Box::new(cat.clone()));
    }
    if filter.ascending {
        sql.push_str(" ORDER BY t.occurred_at, t.id");
    } else {
        sql.push_str(" ORDER BY t.occurred_at DESC, t.id DESC");
    }
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(transaction_from_row(r)?);
    }
    Ok(data)
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let filter = TxFilter {
        project_id: sub.get_one::<i64>("project").copied(),
        category: opt_text(sub, "category"),
        limit: sub.get_one::<usize>("limit").copied(),
        ascending: false,
    };
    load_transactions(conn, &filter)
}

pub fn load_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM transactions t WHERE t.id=?1",
        TX_COLUMNS
    ))?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => transaction_from_row(r),
        None => Err(anyhow!("Transaction #{} not found", id)),
    }
}

/// All amounts recorded against a project, unfiltered.
pub fn amounts_for_project(conn: &Connection, project_id: i64) -> Result<Vec<Decimal>> {
    let mut stmt = conn.prepare("SELECT id, amount FROM transactions WHERE project_id=?1")?;
    let rows = stmt.query_map(params![project_id], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, s) = row?;
        out.push(
            parse_decimal(&s)
                .with_context(|| format!("Invalid amount '{}' in transaction #{}", s, id))?,
        );
    }
    Ok(out)
}

/// Case-insensitive substring match over vendor and notes.
pub fn search_transactions(conn: &Connection, query: &str) -> Result<Vec<Transaction>> {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let term = format!("%{}%", escaped);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM transactions t
         WHERE t.vendor LIKE ?1 ESCAPE '\\' OR t.notes LIKE ?1 ESCAPE '\\'
         ORDER BY t.occurred_at DESC, t.id DESC LIMIT ?2",
        TX_COLUMNS
    ))?;
    let mut rows = stmt.query(params![term, SEARCH_LIMIT as i64])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(transaction_from_row(r)?);
    }
    Ok(data)
}

fn print_transactions(conn: &Connection, sub: &clap::ArgMatches, data: &[Transaction]) -> Result<()> {
    if maybe_print_json(flag(sub, "json"), flag(sub, "jsonl"), &data)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.occurred_at.date_naive().to_string(),
                t.project_id.to_string(),
                t.vendor.clone().unwrap_or_default(),
                fmt_money(&t.amount, &ccy),
                t.category.clone().unwrap_or_default(),
                t.status.to_string(),
                t.receipts.len().to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Project", "Vendor", "Amount", "Category", "Status", "Receipts"],
            rows,
        )
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    print_transactions(conn, sub, &data)
}

fn search(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let query = required(sub, "query")?;
    let data = search_transactions(conn, query)?;
    tracing::debug!(query = %query, hits = data.len(), "search");
    print_transactions(conn, sub, &data)
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    load_transaction(conn, id)?;

    let mut changed = Vec::new();
    if let Some(raw) = sub.get_one::<String>("amount") {
        let amount = parse_amount(raw)?;
        conn.execute(
            "UPDATE transactions SET amount=?1 WHERE id=?2",
            params![amount.to_string(), id],
        )?;
        changed.push("amount");
    }
    if let Some(raw) = sub.get_one::<String>("date") {
        let ts = parse_timestamp(raw)?;
        conn.execute(
            "UPDATE transactions SET occurred_at=?1 WHERE id=?2",
            params![ts.to_rfc3339_opts(SecondsFormat::Secs, true), id],
        )?;
        changed.push("date");
    }
    if let Some(raw) = sub.get_one::<String>("status") {
        let status: TransactionStatus = raw.parse()?;
        conn.execute(
            "UPDATE transactions SET status=?1 WHERE id=?2",
            params![status.as_str(), id],
        )?;
        changed.push("status");
    }
    // Text fields: an empty value clears the column.
    for (arg, column) in [("vendor", "vendor"), ("category", "category"), ("note", "notes")] {
        if sub.get_one::<String>(arg).is_some() {
            conn.execute(
                &format!("UPDATE transactions SET {}=?1 WHERE id=?2", column),
                params![opt_text(sub, arg), id],
            )?;
            changed.push(arg);
        }
    }

    if changed.is_empty() {
        println!("Nothing to update for transaction #{}", id);
    } else {
        tracing::info!(id, fields = ?changed, "transaction updated");
        println!("Updated transaction #{} ({})", id, changed.join(", "));
    }
    Ok(())
}

/// Replace a transaction's receipt list, migrating it off the legacy column.
pub fn store_receipts(conn: &Connection, id: i64, receipts: &[String]) -> Result<()> {
    conn.execute(
        "UPDATE transactions SET receipt_urls=?1, receipt_url=NULL WHERE id=?2",
        params![receipts_json(receipts)?, id],
    )?;
    Ok(())
}

fn attach(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    let mut receipts = load_transaction(conn, id)?.receipts;
    let before = receipts.len();
    if let Some(refs) = sub.get_many::<String>("refs") {
        for r in refs.map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !receipts.iter().any(|existing| existing == r) {
                receipts.push(r.to_string());
            }
        }
    }
    store_receipts(conn, id, &receipts)?;
    println!(
        "Transaction #{} now has {} receipt(s) ({} added)",
        id,
        receipts.len(),
        receipts.len() - before
    );
    Ok(())
}

fn detach(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    let target = required(sub, "ref")?.trim();
    let mut receipts = load_transaction(conn, id)?.receipts;
    let before = receipts.len();
    receipts.retain(|r| r != target);
    if receipts.len() == before {
        return Err(anyhow!("Transaction #{} has no receipt '{}'", id, target));
    }
    store_receipts(conn, id, &receipts)?;
    println!("Removed receipt '{}' from transaction #{}", target, id);
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(anyhow!("Transaction #{} not found", id));
    }
    println!("Removed transaction #{}", id);
    Ok(())
}
