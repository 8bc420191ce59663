// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use grantburn::dashboard::{UNCATEGORIZED, aggregate_dashboard};
use grantburn::models::{SpendRecord, Transaction, TransactionStatus};
use rust_decimal::Decimal;

fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn rec(amount: i64, category: Option<&str>, at: DateTime<Utc>) -> SpendRecord {
    SpendRecord {
        amount: Decimal::from(amount),
        category: category.map(|c| c.to_string()),
        occurred_at: at,
    }
}

#[test]
fn categories_merge_and_default_to_uncategorized() {
    let now = ts(2024, 6, 15, 12);
    let records = vec![
        rec(10, Some("books"), ts(2024, 6, 1, 9)),
        rec(5, None, ts(2024, 6, 2, 9)),
        rec(20, Some("books"), ts(2024, 6, 3, 9)),
    ];
    let agg = aggregate_dashboard(&records, now);

    let pairs: Vec<(&str, Decimal)> = agg
        .category_totals
        .iter()
        .map(|c| (c.label.as_str(), c.total))
        .collect();
    assert_eq!(
        pairs,
        vec![("books", Decimal::from(30)), (UNCATEGORIZED, Decimal::from(5))]
    );
    assert_eq!(agg.total_spent, Decimal::from(35));
}

#[test]
fn blank_categories_count_as_uncategorized_and_labels_sort() {
    let now = ts(2024, 6, 15, 12);
    let records = vec![
        rec(1, Some("travel"), now),
        rec(2, Some(""), now),
        rec(3, Some("   "), now),
        rec(4, Some("dining"), now),
        rec(5, Some("books"), now),
    ];
    let agg = aggregate_dashboard(&records, now);
    let labels: Vec<&str> = agg.category_totals.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["books", "dining", "travel", UNCATEGORIZED]);
    assert_eq!(agg.category_totals[3].total, Decimal::from(5));
}

#[test]
fn trailing_window_excludes_older_months_but_keeps_totals() {
    let now = ts(2024, 6, 15, 12);
    let records = vec![
        rec(40, Some("books"), ts(2024, 1, 1, 10)),
        rec(25, Some("books"), ts(2023, 12, 31, 10)),
        rec(7, None, ts(2024, 6, 14, 8)),
    ];
    let agg = aggregate_dashboard(&records, now);

    let keys: Vec<&str> = agg.monthly_series.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06"]
    );
    assert_eq!(agg.monthly_series[0].amount, Decimal::from(40));
    assert_eq!(agg.monthly_series[0].month, "01");
    assert_eq!(agg.monthly_series[5].amount, Decimal::from(7));
    let in_window: Decimal = agg.monthly_series.iter().map(|m| m.amount).sum();
    assert_eq!(in_window, Decimal::from(47));

    assert_eq!(agg.total_spent, Decimal::from(72));
    assert_eq!(agg.category_totals[0].total, Decimal::from(65));
}

#[test]
fn window_rolls_over_year_boundary() {
    let agg = aggregate_dashboard(&[], ts(2024, 2, 10, 0));
    let keys: Vec<&str> = agg.monthly_series.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["2023-09", "2023-10", "2023-11", "2023-12", "2024-01", "2024-02"]
    );
    let labels: Vec<&str> = agg.monthly_series.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(labels, vec!["09", "10", "11", "12", "01", "02"]);
}

#[test]
fn empty_input_gives_zeroed_series() {
    let agg = aggregate_dashboard(&[], ts(2024, 6, 15, 12));
    assert_eq!(agg.total_spent, Decimal::ZERO);
    assert!(agg.category_totals.is_empty());
    assert_eq!(agg.monthly_series.len(), 6);
    assert!(agg.monthly_series.iter().all(|m| m.amount.is_zero()));
}

#[test]
fn months_follow_the_evaluation_timezone() {
    // 20:00 UTC on May 31 is already June 1 at UTC+8.
    let late_may = rec(9, None, ts(2024, 5, 31, 20));

    let utc = aggregate_dashboard(std::slice::from_ref(&late_may), ts(2024, 6, 15, 12));
    let may = utc.monthly_series.iter().find(|m| m.key == "2024-05").unwrap();
    assert_eq!(may.amount, Decimal::from(9));

    let plus8 = FixedOffset::east_opt(8 * 3600).unwrap();
    let now = plus8.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let local = aggregate_dashboard(std::slice::from_ref(&late_may), now);
    let june = local.monthly_series.iter().find(|m| m.key == "2024-06").unwrap();
    assert_eq!(june.amount, Decimal::from(9));
    let may = local.monthly_series.iter().find(|m| m.key == "2024-05").unwrap();
    assert!(may.amount.is_zero());
}

#[test]
fn repeated_aggregation_is_identical() {
    let now = ts(2024, 6, 15, 12);
    let records = vec![
        rec(3, Some("b"), ts(2024, 4, 1, 0)),
        rec(4, Some("a"), ts(2024, 5, 1, 0)),
    ];
    assert_eq!(
        aggregate_dashboard(&records, now),
        aggregate_dashboard(&records, now)
    );
}

#[test]
fn transactions_convert_into_spend_records() {
    let tx = Transaction {
        id: 4,
        project_id: 1,
        amount: Decimal::new(1999, 2),
        vendor: Some("Paper Mill".into()),
        occurred_at: ts(2024, 6, 3, 9),
        category: Some("supplies".into()),
        status: TransactionStatus::Invoiced,
        notes: None,
        receipts: vec!["1/a.jpg".into()],
    };
    let records: Vec<SpendRecord> = std::slice::from_ref(&tx).iter().map(SpendRecord::from).collect();
    let agg = aggregate_dashboard(&records, ts(2024, 6, 15, 12));
    assert_eq!(agg.total_spent, Decimal::new(1999, 2));
    assert_eq!(agg.category_totals[0].label, "supplies");
    assert_eq!(agg.monthly_series[5].amount, Decimal::new(1999, 2));
}

#[test]
fn oversized_amounts_saturate_every_sum() {
    let huge = Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0);
    let at = ts(2024, 6, 3, 9);
    let records = vec![
        SpendRecord { amount: huge, category: Some("lab".into()), occurred_at: at },
        SpendRecord { amount: huge, category: Some("lab".into()), occurred_at: at },
    ];
    let agg = aggregate_dashboard(&records, ts(2024, 6, 15, 12));
    assert_eq!(agg.total_spent, Decimal::MAX);
    assert_eq!(agg.category_totals[0].total, Decimal::MAX);
    assert_eq!(agg.monthly_series[5].amount, Decimal::MAX);
}

#[test]
fn non_blank_labels_are_kept_verbatim() {
    let now = ts(2024, 6, 15, 12);
    let records = vec![
        rec(1, Some("books"), now),
        rec(2, Some("books "), now),
        rec(4, Some(" "), now),
    ];
    let agg = aggregate_dashboard(&records, now);
    let pairs: Vec<(&str, Decimal)> = agg
        .category_totals
        .iter()
        .map(|c| (c.label.as_str(), c.total))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("books", Decimal::from(1)),
            ("books ", Decimal::from(2)),
            (UNCATEGORIZED, Decimal::from(4)),
        ]
    );
}
