// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use grantburn::commands::{doctor, transactions};
use grantburn::models::{TransactionStatus, normalize_receipts};
use grantburn::{cli, db};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO projects(id,name,total_budget,start_date,deadline) VALUES (1,'Survey','500','2025-01-01','2025-06-30')",
        [],
    )
    .unwrap();
    for i in 1..=3 {
        conn.execute(
            "INSERT INTO transactions(project_id,amount,vendor,occurred_at,category) VALUES (1,'10',?1,?2,'books')",
            params![format!("Vendor {}", i), format!("2025-01-0{}T09:00:00Z", i)],
        )
        .unwrap();
    }
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["grantburn", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_limit_respected() {
    let conn = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["grantburn", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].occurred_at.date_naive().to_string(), "2025-01-03");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn add_stores_receipts_and_defaults_status() {
    let conn = setup();
    run(
        &conn,
        &[
            "add", "--project", "1", "--amount", "42.10", "--vendor", " Print Shop ", "--date",
            "2025-02-14T15:30:00+08:00", "--receipt", "1/a.jpg", "--receipt", "1/b.jpg",
        ],
    )
    .unwrap();
    let id = conn.last_insert_rowid();
    let tx = transactions::load_transaction(&conn, id).unwrap();
    assert_eq!(tx.amount, Decimal::new(4210, 2));
    assert_eq!(tx.vendor.as_deref(), Some("Print Shop"));
    assert_eq!(tx.status, TransactionStatus::Spent);
    assert_eq!(tx.receipts, vec!["1/a.jpg".to_string(), "1/b.jpg".to_string()]);
    assert_eq!(tx.occurred_at.to_rfc3339(), "2025-02-14T07:30:00+00:00");
    assert!(tx.category.is_none());
}

#[test]
fn add_rejects_non_positive_amount_and_unknown_project() {
    let conn = setup();
    assert!(run(&conn, &["add", "--project", "1", "--amount", "0"]).is_err());
    assert!(run(&conn, &["add", "--project", "1", "--amount=-3"]).is_err());
    assert!(run(&conn, &["add", "--project", "7", "--amount", "3"]).is_err());
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 3);
}

#[test]
fn legacy_receipt_column_is_normalized_and_migrated_on_attach() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(project_id,amount,occurred_at,receipt_url) VALUES (1,'5','2025-01-10T00:00:00Z','1/old.png')",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();

    let tx = transactions::load_transaction(&conn, id).unwrap();
    assert_eq!(tx.receipts, vec!["1/old.png".to_string()]);
    let issues = doctor::find_issues(&conn).unwrap();
    assert!(issues.iter().any(|i| i[0] == "legacy_receipt"));

    run(&conn, &["attach", &id.to_string(), "1/new.png", "1/old.png"]).unwrap();
    let tx = transactions::load_transaction(&conn, id).unwrap();
    assert_eq!(
        tx.receipts,
        vec!["1/old.png".to_string(), "1/new.png".to_string()]
    );
    let legacy: Option<String> = conn
        .query_row("SELECT receipt_url FROM transactions WHERE id=?1", params![id], |r| r.get(0))
        .unwrap();
    assert!(legacy.is_none());
    assert!(doctor::find_issues(&conn).unwrap().is_empty());

    run(&conn, &["detach", &id.to_string(), "1/old.png"]).unwrap();
    let tx = transactions::load_transaction(&conn, id).unwrap();
    assert_eq!(tx.receipts, vec!["1/new.png".to_string()]);
    assert!(run(&conn, &["detach", &id.to_string(), "1/missing.png"]).is_err());
}

#[test]
fn receipt_normalization_prefers_the_list() {
    assert_eq!(
        normalize_receipts(Some(r#"["a","b"]"#), Some("legacy")),
        vec!["a".to_string(), "b".to_string()]
    );
    assert_eq!(normalize_receipts(None, Some("legacy")), vec!["legacy".to_string()]);
    assert_eq!(normalize_receipts(Some("not json"), Some("legacy")), vec!["legacy".to_string()]);
    assert!(normalize_receipts(None, Some("  ")).is_empty());
    assert!(normalize_receipts(None, None).is_empty());
}

#[test]
fn search_matches_vendor_and_notes_case_insensitively() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(project_id,amount,vendor,notes,occurred_at) VALUES (1,'8','Cafe','Book fair lunch','2025-01-05T12:00:00Z')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(project_id,amount,vendor,occurred_at) VALUES (1,'8','Corner Books','2025-01-06T12:00:00Z')",
        [],
    )
    .unwrap();

    let hits = transactions::search_transactions(&conn, "BOOK").unwrap();
    let vendors: Vec<&str> = hits.iter().filter_map(|t| t.vendor.as_deref()).collect();
    assert_eq!(vendors, vec!["Corner Books", "Cafe"]);

    assert!(transactions::search_transactions(&conn, "%").unwrap().is_empty());
    assert_eq!(transactions::search_transactions(&conn, "vendor").unwrap().len(), 3);
}

#[test]
fn edit_updates_and_clears_fields() {
    let conn = setup();
    run(
        &conn,
        &["edit", "1", "--amount", "12.75", "--category", "", "--status", "invoiced"],
    )
    .unwrap();
    let tx = transactions::load_transaction(&conn, 1).unwrap();
    assert_eq!(tx.amount, Decimal::new(1275, 2));
    assert!(tx.category.is_none());
    assert_eq!(tx.status, TransactionStatus::Invoiced);
    assert_eq!(tx.vendor.as_deref(), Some("Vendor 1"));

    assert!(run(&conn, &["edit", "1", "--amount", "0"]).is_err());
    assert!(run(&conn, &["edit", "99", "--amount", "1"]).is_err());
}
