// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::amounts_for_project;
use crate::models::{Project, ProjectStatus};
use crate::stats::{ProjectStats, compute_project_stats};
use crate::utils::{
    flag, fmt_money, fmt_pct, get_currency, maybe_print_json, parse_budget, parse_date,
    pretty_table, required, resolve_now,
};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(conn, sub)?;
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("stats", sub)) => stats(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("status", sub)) => set_status(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn id_arg(sub: &clap::ArgMatches) -> Result<i64> {
    sub.get_one::<i64>("id")
        .copied()
        .ok_or_else(|| anyhow!("Missing project id"))
}

pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<i64> {
    let name = required(sub, "name")?.trim().to_string();
    if name.is_empty() {
        return Err(anyhow!("Project name must not be empty"));
    }
    let budget = parse_budget(required(sub, "budget")?)?;
    let start = parse_date(required(sub, "start")?)?;
    let deadline = parse_date(required(sub, "deadline")?)?;
    if deadline < start {
        tracing::warn!(%start, %deadline, "deadline precedes start; project will read as fully elapsed");
    }

    conn.execute(
        "INSERT INTO projects(name, total_budget, start_date, deadline) VALUES (?1, ?2, ?3, ?4)",
        params![name, budget.to_string(), start.to_string(), deadline.to_string()],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, %name, %budget, "project created");
    println!(
        "Created project #{} '{}' budget {} ({} to {})",
        id, name, budget, start, deadline
    );
    Ok(id)
}

const PROJECT_COLUMNS: &str = "id, name, total_budget, start_date, deadline, status";

fn budget_from_column(raw: &str, id: i64) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(project = id, raw, %err, "unparsable budget column");
            f64::NAN
        }
    }
}

fn project_from_raw(raw: RawProject) -> Result<Project> {
    let (id, name, budget, start, deadline, status) = raw;
    Ok(Project {
        id,
        name,
        total_budget: budget_from_column(&budget, id),
        start_date: parse_date(&start)
            .with_context(|| format!("Bad start_date on project #{}", id))?,
        deadline: parse_date(&deadline)
            .with_context(|| format!("Bad deadline on project #{}", id))?,
        status: status.parse()?,
    })
}

type RawProject = (i64, String, String, String, String, String);

fn raw_project(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawProject> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
    ))
}

pub fn load_project(conn: &Connection, id: i64) -> Result<Project> {
    let raw = conn
        .query_row(
            &format!("SELECT {} FROM projects WHERE id=?1", PROJECT_COLUMNS),
            params![id],
            raw_project,
        )
        .optional()?
        .with_context(|| format!("Project #{} not found", id))?;
    project_from_raw(raw)
}

/// Projects newest first, optionally restricted to one status.
pub fn load_projects(conn: &Connection, status: Option<ProjectStatus>) -> Result<Vec<Project>> {
    let mut sql = format!("SELECT {} FROM projects", PROJECT_COLUMNS);
    let raws: Vec<RawProject> = if let Some(st) = status {
        sql.push_str(" WHERE status=?1 ORDER BY created_at DESC, id DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![st.as_str()], raw_project)?;
        rows.collect::<rusqlite::Result<_>>()?
    } else {
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], raw_project)?;
        rows.collect::<rusqlite::Result<_>>()?
    };
    raws.into_iter().map(project_from_raw).collect()
}

/// Stats for one project; a non-finite budget is returned as an error.
pub fn project_stats(conn: &Connection, id: i64, now: DateTime<Utc>) -> Result<ProjectStats> {
    let project = load_project(conn, id)?;
    let amounts = amounts_for_project(conn, id)?;
    let stats = compute_project_stats(&project, &amounts, now)
        .with_context(|| format!("Cannot compute stats for project #{}", id))?;
    Ok(stats)
}

#[derive(Serialize)]
pub struct ProjectRow {
    #[serde(flatten)]
    pub project: Project,
    pub stats: ProjectStats,
}

/// Every listed project with its stats. Unusable budgets degrade to
/// zeroed stats so one bad row does not hide the rest.
pub fn project_rows(
    conn: &Connection,
    status: Option<ProjectStatus>,
    now: DateTime<Utc>,
) -> Result<Vec<ProjectRow>> {
    let mut out = Vec::new();
    for project in load_projects(conn, status)? {
        let amounts = amounts_for_project(conn, project.id)?;
        let stats = compute_project_stats(&project, &amounts, now).unwrap_or_else(|err| {
            tracing::warn!(project = project.id, %err, "falling back to zeroed stats");
            ProjectStats::zeroed()
        });
        out.push(ProjectRow { project, stats });
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let status = match sub.get_one::<String>("status") {
        Some(s) => Some(s.parse::<ProjectStatus>()?),
        None => None,
    };
    let now = resolve_now(sub)?;
    let data = project_rows(conn, status, now)?;
    if maybe_print_json(flag(sub, "json"), flag(sub, "jsonl"), &data)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows = data
        .iter()
        .map(|r| {
            vec![
                r.project.id.to_string(),
                r.project.name.clone(),
                r.project.status.to_string(),
                fmt_money(&r.stats.total_budget, &ccy),
                fmt_pct(r.stats.budget_consumed_pct),
                fmt_pct(r.stats.time_elapsed_pct),
                fmt_money(&r.stats.remaining_clamped, &ccy),
                r.stats.days_left().to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Status", "Budget", "Burn", "Time", "Remaining", "Days left"],
            rows,
        )
    );
    Ok(())
}

fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    let now = resolve_now(sub)?;
    let project = load_project(conn, id)?;
    let st = project_stats(conn, id, now)?;
    if maybe_print_json(flag(sub, "json"), false, &st)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let mut rows = vec![
        vec!["Project".into(), format!("#{} {}", project.id, project.name)],
        vec!["Window".into(), format!("{} to {}", project.start_date, project.deadline)],
        vec!["Budget".into(), fmt_money(&st.total_budget, &ccy)],
        vec!["Spent".into(), fmt_money(&st.total_spent, &ccy)],
        vec!["Budget consumed".into(), fmt_pct(st.budget_consumed_pct)],
        vec!["Time elapsed".into(), fmt_pct(st.time_elapsed_pct)],
        vec!["Remaining".into(), fmt_money(&st.remaining_clamped, &ccy)],
        vec!["Days left".into(), st.days_left().to_string()],
    ];
    if st.is_overspent() {
        rows.push(vec!["Overspent by".into(), fmt_money(&st.overspent_amount(), &ccy)]);
    }
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    // Surface a missing project before touching anything.
    load_project(conn, id)?;

    let mut changed = Vec::new();
    if let Some(name) = sub.get_one::<String>("name").map(|s| s.trim()) {
        if name.is_empty() {
            return Err(anyhow!("Project name must not be empty"));
        }
        conn.execute("UPDATE projects SET name=?1 WHERE id=?2", params![name, id])?;
        changed.push("name");
    }
    if let Some(raw) = sub.get_one::<String>("budget") {
        let budget = parse_budget(raw)?;
        conn.execute(
            "UPDATE projects SET total_budget=?1 WHERE id=?2",
            params![budget.to_string(), id],
        )?;
        changed.push("budget");
    }
    if let Some(raw) = sub.get_one::<String>("start") {
        let start = parse_date(raw)?;
        conn.execute(
            "UPDATE projects SET start_date=?1 WHERE id=?2",
            params![start.to_string(), id],
        )?;
        changed.push("start");
    }
    if let Some(raw) = sub.get_one::<String>("deadline") {
        let deadline = parse_date(raw)?;
        conn.execute(
            "UPDATE projects SET deadline=?1 WHERE id=?2",
            params![deadline.to_string(), id],
        )?;
        changed.push("deadline");
    }

    if changed.is_empty() {
        println!("Nothing to update for project #{}", id);
    } else {
        tracing::info!(id, fields = ?changed, "project updated");
        println!("Updated project #{} ({})", id, changed.join(", "));
    }
    Ok(())
}

fn set_status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    let status: ProjectStatus = required(sub, "status")?.parse()?;
    let n = conn.execute(
        "UPDATE projects SET status=?1 WHERE id=?2",
        params![status.as_str(), id],
    )?;
    if n == 0 {
        return Err(anyhow!("Project #{} not found", id));
    }
    println!("Project #{} is now {}", id, status);
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    let n = conn.execute("DELETE FROM projects WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(anyhow!("Project #{} not found", id));
    }
    println!("Removed project #{}", id);
    Ok(())
}
