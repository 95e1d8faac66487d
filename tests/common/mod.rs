//! Shared fixtures for integration tests
#![allow(dead_code)]

use annotrack::commands::init::initialize;
use annotrack::config::Config;
use annotrack::engine::{AnnotationSession, RecoveryReport};
use annotrack::export::gateway_for_work_dir;
use annotrack::fs::{read_catalog, FileCheckpoint, WorkDir};
use annotrack::models::{Category, InconsistencyPart, TaskRecord, TextPart};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// P1 with two sub-tasks, P2 with one; P0 is consistent and drops out.
pub const DATASET: &str = r#"{
    "P0": {"has_inconsistency": false, "inconsistencies": ["ignored"]},
    "P1": {"has_inconsistency": true, "inconsistencies": ["t1", "t2"]},
    "P2": {"has_inconsistency": true, "inconsistencies": ["t3"]}
}"#;

/// Initialized project in a temp dir
pub struct Project {
    pub temp: TempDir,
}

impl Project {
    pub fn new(batch_size: usize) -> Self {
        Self::with_dataset(DATASET, batch_size)
    }

    pub fn with_dataset(dataset_json: &str, batch_size: usize) -> Self {
        let temp = TempDir::new().unwrap();
        let dataset = temp.path().join("dataset.json");
        fs::write(&dataset, dataset_json).unwrap();
        initialize(temp.path(), &dataset, Some(batch_size), false).unwrap();
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn work_dir(&self) -> WorkDir {
        let work_dir = WorkDir::new(self.root()).unwrap();
        work_dir.load().unwrap();
        work_dir
    }

    pub fn open(&self) -> (AnnotationSession, RecoveryReport) {
        let work_dir = self.work_dir();
        let config = Config::load(&work_dir.config_path()).unwrap();
        let catalog = read_catalog(&work_dir.catalog_path()).unwrap();
        let gateway = gateway_for_work_dir(&work_dir, config.export.include_images).unwrap();
        AnnotationSession::open(
            catalog,
            Box::new(FileCheckpoint::for_work_dir(&work_dir)),
            gateway,
            config.export.batch_size,
        )
        .unwrap()
    }

    pub fn write_checkpoint(&self, json: &str) {
        fs::write(self.work_dir().checkpoint_path(), json).unwrap();
    }

    pub fn exports(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = fs::read_dir(self.work_dir().exports_dir())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext == "zip" || ext == "json")
            })
            .collect();
        paths.sort();
        paths
    }
}

pub fn text_record(description: &str) -> TaskRecord {
    TaskRecord::new(
        vec![InconsistencyPart::Text(TextPart {
            page: 1,
            content: format!("quoted text for {description}"),
            line: 12,
        })],
        "",
        Category::FigureText,
        description,
    )
}
