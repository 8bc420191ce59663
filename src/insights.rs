// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Plain-text financial summary handed to the chat assistant.

use crate::models::{Project, Transaction};
use crate::stats::{DAY_MS, ProjectStats, compute_project_stats, saturating_sum};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write as _;

pub const RECENT_LIMIT: usize = 20;
pub const RECENT_SHOWN: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
    pub total_budget: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub used_percent: i64,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTransaction {
    pub vendor: Option<String>,
    pub amount: Decimal,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub projects: Vec<ProjectSummary>,
    pub recent: Vec<RecentTransaction>,
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub total_remaining: Decimal,
}

/// Whole days from `now` to the deadline, rounded up and floored at zero.
/// Unlike the stats window this counts from today even before the start date.
pub fn days_until(deadline: NaiveDate, now: DateTime<Utc>) -> i64 {
    let ms = (deadline.and_time(NaiveTime::MIN).and_utc() - now).num_milliseconds();
    (ms as f64 / DAY_MS).ceil().max(0.0) as i64
}

impl DataSummary {
    /// `transactions` are expected newest first; per-project spend is taken
    /// from whatever subset the caller fetched.
    pub fn build(projects: &[Project], transactions: &[Transaction], now: DateTime<Utc>) -> Self {
        let mut summaries = Vec::with_capacity(projects.len());
        for p in projects {
            let amounts: Vec<Decimal> = transactions
                .iter()
                .filter(|tx| tx.project_id == p.id)
                .map(|tx| tx.amount)
                .collect();
            let stats = compute_project_stats(p, &amounts, now).unwrap_or_else(|err| {
                tracing::warn!(project = p.id, %err, "using zeroed stats in summary");
                ProjectStats::zeroed()
            });
            summaries.push(ProjectSummary {
                id: p.id,
                name: p.name.clone(),
                total_budget: stats.total_budget,
                spent: stats.total_spent,
                remaining: stats.remaining_signed,
                used_percent: stats.usage_percent(),
                start_date: p.start_date,
                deadline: p.deadline,
                days_remaining: days_until(p.deadline, now),
            });
        }

        let recent = transactions
            .iter()
            .take(RECENT_LIMIT)
            .map(|tx| RecentTransaction {
                vendor: tx.vendor.clone(),
                amount: tx.amount,
                category: tx.category.clone(),
                date: tx.occurred_at,
            })
            .collect();

        let total_budget = saturating_sum(summaries.iter().map(|p| &p.total_budget));
        let total_spent = saturating_sum(summaries.iter().map(|p| &p.spent));

        DataSummary {
            projects: summaries,
            recent,
            total_budget,
            total_spent,
            total_remaining: total_budget.saturating_sub(total_spent),
        }
    }

    pub fn usage_percent(&self) -> i64 {
        if self.total_budget <= Decimal::ZERO {
            return 0;
        }
        self.total_spent
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|v| v.checked_div(self.total_budget))
            .and_then(|v| i64::try_from(v.round()).ok())
            .unwrap_or(0)
    }
}

pub fn format_for_assistant(data: &DataSummary, currency: &str) -> String {
    let mut out = String::new();
    let money = |d: &Decimal| format!("{} {:.2}", currency, d);

    let _ = writeln!(out, "=== Current financial data ===");
    let _ = writeln!(out);
    let _ = writeln!(out, "Total budget: {}", money(&data.total_budget));
    let _ = writeln!(out, "Spent: {}", money(&data.total_spent));
    let _ = writeln!(out, "Remaining: {}", money(&data.total_remaining));
    let _ = writeln!(out, "Usage: {}%", data.usage_percent());

    if !data.projects.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "=== Projects ===");
        for (i, p) in data.projects.iter().enumerate() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}. {}", i + 1, p.name);
            let _ = writeln!(out, "   - Budget: {}", money(&p.total_budget));
            let _ = writeln!(out, "   - Spent: {} ({}%)", money(&p.spent), p.used_percent);
            let _ = writeln!(out, "   - Remaining: {}", money(&p.remaining));
            let _ = writeln!(
                out,
                "   - Deadline: {} ({} days left)",
                p.deadline, p.days_remaining
            );
        }
    }

    if !data.recent.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "=== Recent transactions (latest {}) ===", RECENT_SHOWN);
        for tx in data.recent.iter().take(RECENT_SHOWN) {
            let vendor = tx
                .vendor
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or("Unnamed");
            let category = tx
                .category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .map(|c| format!(" [{}]", c))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "- {}: {}{} {}",
                tx.date.date_naive(),
                vendor,
                category,
                money(&tx.amount)
            );
        }
    }

    out.trim_end().to_string()
}
