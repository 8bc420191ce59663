// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::StatusParseError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            "archived" => Ok(ProjectStatus::Archived),
            _ => Err(StatusParseError {
                kind: "project",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Spent,
    Invoiced,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Spent => "spent",
            TransactionStatus::Invoiced => "invoiced",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spent" => Ok(TransactionStatus::Spent),
            "invoiced" => Ok(TransactionStatus::Invoiced),
            _ => Err(StatusParseError {
                kind: "transaction",
                value: s.to_string(),
            }),
        }
    }
}

/// A budgeted effort. `total_budget` stays a raw number so that a corrupt
/// value reaches the stats engine, which rejects anything non-finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub total_budget: f64,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub project_id: i64,
    pub amount: Decimal,
    pub vendor: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub category: Option<String>,
    pub status: TransactionStatus,
    pub notes: Option<String>,
    pub receipts: Vec<String>,
}

/// The slice of a transaction the dashboard needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRecord {
    pub amount: Decimal,
    pub category: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl From<&Transaction> for SpendRecord {
    fn from(tx: &Transaction) -> Self {
        SpendRecord {
            amount: tx.amount,
            category: tx.category.clone(),
            occurred_at: tx.occurred_at,
        }
    }
}

/// Collapse the two receipt columns into one list.
///
/// Rows written before attachments became a list only carry the single
/// `receipt_url` column; newer rows carry a JSON array in `receipt_urls`.
/// The array wins whenever it is present and readable.
pub fn normalize_receipts(plural: Option<&str>, singular: Option<&str>) -> Vec<String> {
    if let Some(raw) = plural.map(str::trim).filter(|s| !s.is_empty()) {
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(list) => return list,
            Err(err) => {
                tracing::warn!(%err, raw, "unreadable receipt_urls column, falling back")
            }
        }
    }
    singular
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| vec![s.to_string()])
        .unwrap_or_default()
}
