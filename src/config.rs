// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_AI_ENDPOINT: &str = "https://api.siliconflow.cn/v1/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "deepseek-ai/DeepSeek-V3";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// Process-wide settings, built once in `main` and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub assistant: AssistantConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = match get("GRANTBURN_DB") {
            Some(p) => PathBuf::from(p),
            None => crate::db::default_db_path()?,
        };

        let timeout_secs = match get("GRANTBURN_AI_TIMEOUT") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("Invalid GRANTBURN_AI_TIMEOUT '{}', expected seconds", raw))?,
            None => DEFAULT_AI_TIMEOUT_SECS,
        };

        Ok(AppConfig {
            db_path,
            assistant: AssistantConfig {
                endpoint: get("GRANTBURN_AI_ENDPOINT").unwrap_or_else(|| DEFAULT_AI_ENDPOINT.into()),
                model: get("GRANTBURN_AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.into()),
                api_key: get("GRANTBURN_AI_KEY").or_else(|| get("DEEPSEEK_API_KEY")),
                temperature: 0.2,
                timeout_secs,
            },
        })
    }
}
