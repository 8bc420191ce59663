// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-project burn statistics.
//!
//! Everything here is a pure function of a project row, its transaction
//! amounts, and the evaluation instant. Percentages are clamped to `[0, 1]`
//! no matter how odd the inputs are: negative spend, a zero budget, a
//! deadline before the start date, or `now` outside the project window.

use crate::errors::StatsError;
use crate::models::Project;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

pub const DAY_MS: f64 = 1000.0 * 60.0 * 60.0 * 24.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectStats {
    pub budget_consumed_pct: f64,
    pub time_elapsed_pct: f64,
    /// `total_budget - total_spent`; negative when overspent.
    pub remaining_signed: Decimal,
    /// `remaining_signed` floored at zero, for "left to spend" displays.
    pub remaining_clamped: Decimal,
    pub days_remaining: f64,
    pub total_budget: Decimal,
    pub total_spent: Decimal,
}

impl ProjectStats {
    /// Stats for a project whose inputs could not be used.
    pub fn zeroed() -> Self {
        ProjectStats {
            budget_consumed_pct: 0.0,
            time_elapsed_pct: 0.0,
            remaining_signed: Decimal::ZERO,
            remaining_clamped: Decimal::ZERO,
            days_remaining: 0.0,
            total_budget: Decimal::ZERO,
            total_spent: Decimal::ZERO,
        }
    }

    pub fn is_overspent(&self) -> bool {
        self.remaining_signed.is_sign_negative() && !self.remaining_signed.is_zero()
    }

    pub fn overspent_amount(&self) -> Decimal {
        if self.is_overspent() {
            self.remaining_signed.abs()
        } else {
            Decimal::ZERO
        }
    }

    /// Whole days left, rounded up, as shown on project cards.
    pub fn days_left(&self) -> i64 {
        self.days_remaining.ceil().max(0.0) as i64
    }

    /// Spend as a rounded percentage of budget, not clamped, so overspend
    /// reads as e.g. 150.
    pub fn usage_percent(&self) -> i64 {
        if self.total_budget <= Decimal::ZERO {
            return 0;
        }
        ratio(self.total_spent, self.total_budget)
            .map(|r| (r * 100.0).round() as i64)
            .unwrap_or(0)
    }
}

pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

fn ratio(num: Decimal, den: Decimal) -> Option<f64> {
    num.checked_div(den).and_then(|r| r.to_f64())
}

/// Sum that pins at `Decimal::MAX`/`Decimal::MIN` instead of overflowing.
pub fn saturating_sum<'a, I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = &'a Decimal>,
{
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, a| acc.saturating_add(*a))
}

/// Finite budgets beyond what `Decimal` can hold are pinned to its bounds;
/// sub-unit values it cannot represent read as zero.
fn budget_to_decimal(budget: f64) -> Decimal {
    match Decimal::try_from(budget) {
        Ok(d) => d,
        Err(_) if budget.abs() < 1.0 => Decimal::ZERO,
        Err(_) if budget.is_sign_negative() => Decimal::MIN,
        Err(_) => Decimal::MAX,
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Compute burn statistics for `project` given every transaction amount
/// recorded against it.
pub fn compute_project_stats(
    project: &Project,
    amounts: &[Decimal],
    now: DateTime<Utc>,
) -> Result<ProjectStats, StatsError> {
    if !project.total_budget.is_finite() {
        return Err(StatsError::InvalidBudget(project.total_budget));
    }
    let total_budget = budget_to_decimal(project.total_budget);
    let total_spent = saturating_sum(amounts);

    let budget_consumed_pct = if total_budget > Decimal::ZERO {
        match ratio(total_spent, total_budget) {
            Some(r) => clamp01(r),
            // Only reachable when the quotient overflows.
            None if total_spent.is_sign_negative() => 0.0,
            None => 1.0,
        }
    } else {
        0.0
    };

    let start = midnight_utc(project.start_date);
    let end = midnight_utc(project.deadline);
    let total_ms = (end - start).num_milliseconds().max(0);
    let elapsed_ms = (now - start).num_milliseconds();

    let time_elapsed_pct = if total_ms == 0 {
        1.0
    } else {
        clamp01(elapsed_ms as f64 / total_ms as f64)
    };

    let total_days = total_ms as f64 / DAY_MS;
    let elapsed_days = (elapsed_ms as f64 / DAY_MS).max(0.0);
    let days_remaining = (total_days - elapsed_days).max(0.0);

    let remaining_signed = total_budget.saturating_sub(total_spent);
    let remaining_clamped = remaining_signed.max(Decimal::ZERO);

    Ok(ProjectStats {
        budget_consumed_pct,
        time_elapsed_pct,
        remaining_signed,
        remaining_clamped,
        days_remaining,
        total_budget,
        total_spent,
    })
}
