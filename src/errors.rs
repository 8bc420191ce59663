// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures raised by the burn-rate engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("Invalid project budget: {0} is not a finite number")]
    InvalidBudget(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} status '{value}'")]
pub struct StatusParseError {
    pub kind: &'static str,
    pub value: String,
}
