pub mod generator;

pub use generator::{generate_completions, generate_completions_to, Shell};
