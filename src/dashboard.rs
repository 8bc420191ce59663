// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cross-project spend aggregates for the dashboard view.

use crate::models::SpendRecord;
use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub const UNCATEGORIZED: &str = "uncategorized";
pub const TRAILING_MONTHS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub label: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySpend {
    /// `YYYY-MM`
    pub key: String,
    /// `MM`, the short axis label
    pub month: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardAggregate {
    pub total_spent: Decimal,
    /// Sorted by label.
    pub category_totals: Vec<CategoryTotal>,
    /// Exactly [`TRAILING_MONTHS`] entries, oldest first, ending at the month of `now`.
    pub monthly_series: Vec<MonthlySpend>,
}

/// Non-blank labels are kept exactly as stored.
pub fn category_label(category: Option<&str>) -> &str {
    match category {
        Some(c) if !c.trim().is_empty() => c,
        _ => UNCATEGORIZED,
    }
}

pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// First day of each month in the trailing window, oldest first.
fn trailing_months(today: NaiveDate) -> Vec<NaiveDate> {
    let first = today.with_day(1).unwrap_or(today);
    (0..TRAILING_MONTHS)
        .rev()
        .filter_map(|back| first.checked_sub_months(Months::new(back)))
        .collect()
}

/// Aggregate every record into a total, per-category sums, and a fixed
/// trailing window of monthly sums.
///
/// Month keys are taken in `now`'s timezone for both the window and each
/// record, so a record near midnight on the last day of a month lands in
/// the same month a viewer in that timezone would see. Records outside the
/// window still count toward the total and the category sums. Sums pin at
/// the `Decimal` bounds rather than overflow.
pub fn aggregate_dashboard<Tz: TimeZone>(
    records: &[SpendRecord],
    now: DateTime<Tz>,
) -> DashboardAggregate {
    let tz = now.timezone();
    let mut total_spent = Decimal::ZERO;
    let mut categories: BTreeMap<String, Decimal> = BTreeMap::new();

    let mut months: Vec<MonthlySpend> = trailing_months(now.date_naive())
        .into_iter()
        .map(|m| MonthlySpend {
            key: month_key(m),
            month: format!("{:02}", m.month()),
            amount: Decimal::ZERO,
        })
        .collect();

    for rec in records {
        total_spent = total_spent.saturating_add(rec.amount);

        let label = category_label(rec.category.as_deref());
        let slot = categories.entry(label.to_string()).or_insert(Decimal::ZERO);
        *slot = slot.saturating_add(rec.amount);

        let key = month_key(rec.occurred_at.with_timezone(&tz).date_naive());
        if let Some(bucket) = months.iter_mut().find(|m| m.key == key) {
            bucket.amount = bucket.amount.saturating_add(rec.amount);
        }
    }

    DashboardAggregate {
        total_spent,
        category_totals: categories
            .into_iter()
            .map(|(label, total)| CategoryTotal { label, total })
            .collect(),
        monthly_series: months,
    }
}
