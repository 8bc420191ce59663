// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::projects::load_projects;
use crate::commands::transactions::{TxFilter, load_transactions};
use crate::config::AssistantConfig;
use crate::insights::{DataSummary, format_for_assistant};
use crate::models::ProjectStatus;
use crate::utils::{get_currency, http_client, required, resolve_now};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Transactions fetched as context for the summary.
pub const CONTEXT_TRANSACTIONS: usize = 100;

const SYSTEM_PROMPT: &str = "You are the Grantburn copilot. Read the project and transaction \
summary provided, answer concisely in the user's language, show the calculation or conclusion, \
and never invent data that is not in the summary.";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub content: Option<String>,
}

pub fn handle(conn: &Connection, cfg: &AssistantConfig, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => {
            let now = resolve_now(sub)?;
            println!("{}", summary_text(conn, now)?);
        }
        Some(("ask", sub)) => {
            let question = required(sub, "question")?;
            let answer = ask(conn, cfg, question, Utc::now())?;
            println!("{}", answer);
        }
        _ => {}
    }
    Ok(())
}

pub fn build_summary(conn: &Connection, now: DateTime<Utc>) -> Result<DataSummary> {
    let projects = load_projects(conn, Some(ProjectStatus::Active))?;
    let transactions = load_transactions(
        conn,
        &TxFilter {
            limit: Some(CONTEXT_TRANSACTIONS),
            ..TxFilter::default()
        },
    )?;
    Ok(DataSummary::build(&projects, &transactions, now))
}

pub fn summary_text(conn: &Connection, now: DateTime<Utc>) -> Result<String> {
    let summary = build_summary(conn, now)?;
    Ok(format_for_assistant(&summary, &get_currency(conn)?))
}

pub fn build_request(cfg: &AssistantConfig, question: &str, summary: &str) -> Result<ChatRequest> {
    let question = question.trim();
    if question.is_empty() {
        return Err(anyhow!("Please enter a question"));
    }
    Ok(ChatRequest {
        model: cfg.model.clone(),
        temperature: cfg.temperature,
        messages: vec![
            ChatMessage {
                role: "system".into(),
                content: SYSTEM_PROMPT.into(),
            },
            ChatMessage {
                role: "user".into(),
                content: format!("Question: {}\n\n{}", question, summary),
            },
        ],
    })
}

pub fn extract_answer(resp: ChatResponse) -> Result<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("Assistant returned no content"))
}

pub fn ask(
    conn: &Connection,
    cfg: &AssistantConfig,
    question: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    let key = cfg
        .api_key
        .as_deref()
        .context("No assistant API key configured (set GRANTBURN_AI_KEY or DEEPSEEK_API_KEY)")?;
    let summary = summary_text(conn, now)?;
    let body = build_request(cfg, question, &summary)?;

    tracing::info!(endpoint = %cfg.endpoint, model = %cfg.model, "querying assistant");
    let client = http_client(cfg.timeout_secs)?;
    let resp: ChatResponse = client
        .post(&cfg.endpoint)
        .bearer_auth(key)
        .json(&body)
        .send()
        .context("Assistant request failed")?
        .error_for_status()
        .context("Assistant call rejected")?
        .json()
        .context("Unreadable assistant response")?;
    extract_answer(resp)
}
