//! Checkpoint and export gateway
//!
//! This module provides:
//! - The checkpoint storage seam and an in-memory implementation
//! - Batch/final export boundary arithmetic
//! - The export watermark and the export gateway with metadata-only fallback

mod gateway;
mod policy;
mod types;

#[cfg(test)]
pub(crate) use gateway::test_support;

pub use gateway::{CheckpointStore, ExportGateway, MemoryCheckpoint, Packager};
pub use policy::export_trigger;
pub use types::{
    ExportKind, ExportOutcome, ExportReason, ExportSnapshot, ExportState, ExportSummary,
};
