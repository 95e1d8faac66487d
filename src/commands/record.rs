//! `annotrack record` and `annotrack skip`
//!
//! Usage: annotrack record <payload|-> [--work-item ID]
//!        annotrack skip [--work-item ID]

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Read;

use super::common::{find_work_dir, open_session, print_counters, print_export, print_task};
use crate::engine::{AnnotationSession, Submission};
use crate::models::TaskRecord;

pub fn execute(payload: String, work_item: Option<String>) -> Result<()> {
    let record = parse_payload(&payload)?;
    submit(record, work_item)
}

pub fn skip(work_item: Option<String>) -> Result<()> {
    submit(TaskRecord::skipped(), work_item)
}

/// Parse a record from inline JSON, or from stdin when `payload` is `-`.
pub fn parse_payload(payload: &str) -> Result<TaskRecord> {
    let content = if payload == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read record from stdin")?;
        buffer
    } else {
        payload.to_string()
    };

    serde_json::from_str(&content)
        .context("Invalid record payload: expected a TaskRecord JSON object")
}

fn submit(record: TaskRecord, work_item: Option<String>) -> Result<()> {
    let work_dir = find_work_dir()?;
    let (mut session, _) = open_session(&work_dir)?;

    let skipped = record.skipped;
    let cursor_before = session.cursor();
    let submission = submit_to(&mut session, record, work_item.as_deref())?;

    println!();
    let verb = if skipped { "Skipped" } else { "Recorded" };
    println!("{} {verb} {}", "✓".green().bold(), cursor_before.to_string().cyan());
    print_counters(&submission.counters);

    if let Some(outcome) = &submission.export {
        print_export(outcome, work_dir.project_root().unwrap_or(work_dir.root()));
    }

    println!();
    if submission.counters.is_finished() {
        println!("{} All tasks complete", "✓".green().bold());
    } else if let Some(task) = session.current_task() {
        print_task(&task, session.catalog().len());
    }

    Ok(())
}

/// Submit against the cursor, guarded by `work_item` when given.
pub fn submit_to(
    session: &mut AnnotationSession,
    record: TaskRecord,
    work_item: Option<&str>,
) -> Result<Submission> {
    let submission = match work_item {
        Some(id) => session.submit_for(id, record)?,
        None => session.submit(record)?,
    };
    Ok(submission)
}
