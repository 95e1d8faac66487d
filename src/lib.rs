pub mod checkpoints;
pub mod commands;
pub mod completions;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod fs;
pub mod logging;
pub mod models;
pub mod utils;
pub mod validation;

pub use engine::{AnnotationSession, Counters, Cursor};
pub use error::EngineError;
