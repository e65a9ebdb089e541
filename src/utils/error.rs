//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading JSON artifacts
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate ID '{id}' in {artifact}")]
    DuplicateId { artifact: &'static str, id: String },
}

/// Errors that can occur while building the call graph index
#[derive(Error, Debug)]
pub enum CallGraphError {
    #[error("Duplicate function '{0}' in call graph")]
    DuplicateFunction(String),
}

/// Errors that can occur while scanning a performance log
#[derive(Error, Debug)]
pub enum PerfLogError {
    #[error("line {line}: unrecognized log tag '{tag}'")]
    UnknownTag { line: u64, tag: String },

    #[error("line {line}: '{tag}' record expects {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        tag: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid {field} '{value}'")]
    InvalidNumber {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: unknown intrinsic version {version}")]
    UnknownVersion { line: u64, version: u8 },

    #[error("Failed to read perf log: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when merging instrumentation with static analysis
#[derive(Error, Debug)]
pub enum CrossCheckError {
    #[error("{} instrumentation entries have no static analysis record: {}", .0.len(), .0.join(", "))]
    UnmatchedSites(Vec<String>),
}

/// Errors that can occur while parsing timing and i-cache logs
#[derive(Error, Debug)]
pub enum TimingError {
    #[error("Run for {workers} workers has {found} rounds, expected {expected}")]
    RoundMismatch {
        workers: u32,
        expected: usize,
        found: usize,
    },

    #[error("Control group ran {control} rounds but experiment ran {experiment}")]
    GroupRoundMismatch { control: usize, experiment: usize },

    #[error("Invalid timing value '{0}'")]
    InvalidValue(String),

    #[error("i-cache section is missing {field}: {section}")]
    MissingField { field: &'static str, section: String },

    #[error("No timed runs found")]
    NoRuns,

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors from the side-car result cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Failed to write CSV: {0}")]
    CsvFailed(#[from] csv::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(#[from] toml::de::Error),

    #[error("Unknown test suite '{0}'")]
    UnknownSuite(String),
}
