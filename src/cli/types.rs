use annotrack::models::BoundingBox;
use annotrack::validation::{clap_bbox_parser, clap_id_validator};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "
{before-help}annotrack {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}";

#[derive(Parser)]
#[command(name = "annotrack")]
#[command(about = "Resumable annotation progress tracking", long_about = None)]
#[command(version)]
#[command(help_template = HELP_TEMPLATE)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    /// Log engine decisions at debug level (overridden by ANNOTRACK_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize .annotrack/ from an inconsistency dataset
    Init {
        /// Path to the dataset JSON (document id -> inconsistencies)
        dataset: PathBuf,

        /// Completions between batch exports (default: 10)
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Reinitialize an existing work directory, archiving its progress
        #[arg(long)]
        force: bool,
    },

    /// Show progress, the cursor and the last export
    Status,

    /// Show the current task
    Next,

    /// Record the current task from a TaskRecord JSON payload
    Record {
        /// Record JSON, or '-' to read it from stdin
        payload: String,

        /// Refuse unless the current task belongs to this work item
        #[arg(short, long, value_parser = clap_id_validator)]
        work_item: Option<String>,
    },

    /// Skip the current task
    Skip {
        /// Refuse unless the current task belongs to this work item
        #[arg(short, long, value_parser = clap_id_validator)]
        work_item: Option<String>,
    },

    /// Export all recorded annotations now
    Export {
        /// Write annotations and summary only, without images
        #[arg(long)]
        metadata_only: bool,
    },

    /// Manage stored image crops
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish)
        shell: String,
    },
}

#[derive(Subcommand)]
pub enum ImageCommands {
    /// Store a PNG crop and print its reference id
    Save {
        /// PNG file to store
        file: PathBuf,

        /// Document the crop was taken from
        #[arg(short, long, value_parser = clap_id_validator)]
        document: String,

        /// Page number, starting at 1
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Crop rectangle as x,y,width,height
        #[arg(short, long, value_parser = clap_bbox_parser)]
        bbox: BoundingBox,
    },

    /// Remove stored images older than the retention window
    Cleanup {
        /// Retention in days (default: images.retention_days from config)
        #[arg(long)]
        days: Option<u64>,
    },
}
