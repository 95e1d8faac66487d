//! Integration tests for the annotate → checkpoint → export cycle over a
//! real work directory.

mod common;

use annotrack::checkpoints::ExportOutcome;
use annotrack::engine::Cursor;
use annotrack::models::TaskRecord;
use common::{text_record, Project};
use std::fs;
use std::io::Read;

fn at(work_item_id: &str, subtask_index: usize) -> Cursor {
    Cursor::At {
        work_item_id: work_item_id.to_string(),
        subtask_index,
    }
}

#[test]
fn test_batch_of_two_over_three_tasks() {
    let project = Project::new(2);
    let (mut session, report) = project.open();
    assert!(report.discrepancies.is_empty());
    assert!(report.resumed_export.is_none());
    assert_eq!(session.cursor(), at("P1", 0));

    let first = session.submit(text_record("t1")).unwrap();
    assert_eq!(first.cursor, at("P1", 1));
    assert_eq!(first.counters.completed, 1);
    assert!(first.export.is_none());

    let second = session.skip().unwrap();
    assert_eq!(second.cursor, at("P2", 0));
    assert_eq!(second.counters.completed, 2);
    assert_eq!(second.counters.valid, 1);
    assert!(matches!(
        second.export,
        Some(ExportOutcome::Full { completed: 2, .. })
    ));

    let third = session.submit(text_record("t3")).unwrap();
    assert_eq!(third.cursor, Cursor::Terminal);
    assert_eq!(third.counters.completed, 3);
    assert!(third.counters.is_finished());
    assert!(matches!(
        third.export,
        Some(ExportOutcome::Full { completed: 3, .. })
    ));

    let exports = project.exports();
    assert_eq!(exports.len(), 2);
    let names: Vec<String> = exports
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert!(names[0].starts_with("annotations_00002_"));
    assert!(names[1].starts_with("annotations_00003_"));
}

#[test]
fn test_checkpoint_survives_reopen() {
    let project = Project::new(10);
    {
        let (mut session, _) = project.open();
        session.submit(text_record("t1")).unwrap();
        session.skip().unwrap();
    }

    let (session, report) = project.open();
    assert!(report.discrepancies.is_empty());
    assert_eq!(session.cursor(), at("P2", 0));

    let records = session.store().records_for("P1");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].description, "t1");
    assert!(!records[0].skipped);
    assert!(records[1].skipped);
}

#[test]
fn test_checkpoint_file_format() {
    let project = Project::new(10);
    let (mut session, _) = project.open();
    session.submit(text_record("t1")).unwrap();

    let raw = fs::read_to_string(project.work_dir().checkpoint_path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["P1"][0]["description"], "t1");
    assert_eq!(json["P1"][0]["inconsistency_parts"][0]["type"], "text");
    assert_eq!(json["P1"][0]["skipped"], false);
}

#[test]
fn test_invalid_record_changes_nothing() {
    let project = Project::new(10);
    let (mut session, _) = project.open();

    let mut incomplete = text_record("t1");
    incomplete.category = None;
    assert!(session.submit(incomplete).is_err());

    assert_eq!(session.counters().completed, 0);
    assert!(!project.work_dir().checkpoint_path().exists());
}

#[test]
fn test_completed_catalog_rejects_further_records() {
    let project = Project::new(10);
    let (mut session, _) = project.open();
    for _ in 0..3 {
        session.submit(TaskRecord::skipped()).unwrap();
    }

    assert!(session.skip().is_err());
    assert_eq!(session.counters().completed, 3);
    assert_eq!(session.counters().valid, 0);
}

#[test]
fn test_zip_export_contents() {
    let project = Project::new(10);
    let (mut session, _) = project.open();
    session.submit(text_record("t1")).unwrap();

    let outcome = session.export_now(false);
    let path = outcome.path().unwrap().clone();
    assert!(!outcome.is_degraded());

    let mut archive = zip::ZipArchive::new(fs::File::open(&path).unwrap()).unwrap();
    let mut summary = String::new();
    archive
        .by_name("export_summary.json")
        .unwrap()
        .read_to_string(&mut summary)
        .unwrap();
    let summary: serde_json::Value = serde_json::from_str(&summary).unwrap();

    assert_eq!(summary["reason"], "manual");
    assert_eq!(summary["completed_count"], 1);
    assert_eq!(summary["total_count"], 3);
    assert_eq!(summary["total_images"], 0);
    assert!(archive.by_name("annotations.json").is_ok());
}

#[test]
fn test_metadata_only_export_on_request() {
    let project = Project::new(10);
    let (mut session, _) = project.open();
    session.skip().unwrap();

    let outcome = session.export_now(true);
    assert!(matches!(outcome, ExportOutcome::MetadataOnly { .. }));
    let path = outcome.path().unwrap();
    assert_eq!(path.extension().unwrap(), "json");

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(doc["summary"]["skipped_annotations"], 1);
}
