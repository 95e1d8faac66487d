/// Name of the work directory created by `annotrack init`.
pub const WORK_DIR_NAME: &str = ".annotrack";

/// Completions between batch exports when the config does not say.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Stored images older than this many days are eligible for cleanup.
pub const DEFAULT_IMAGE_RETENTION_DAYS: u64 = 7;

/// Environment variable overriding `export.batch_size`.
pub const BATCH_SIZE_ENV: &str = "ANNOTRACK_BATCH_SIZE";

/// Environment variable holding the tracing filter directive.
pub const LOG_FILTER_ENV: &str = "ANNOTRACK_LOG";

/// Work directory file names.
pub mod files {
    pub const CONFIG: &str = "config.toml";
    pub const CATALOG: &str = "catalog.json";
    pub const CHECKPOINT: &str = "progress.json";
    pub const EXPORT_STATE: &str = "export-state.toml";
}

/// Characters of the uuid suffix used in image reference ids.
pub const IMAGE_ID_SUFFIX_LEN: usize = 8;
