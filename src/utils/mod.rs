//! Utility modules for configuration, error handling, and path normalization.

pub mod config;
pub mod error;
pub mod paths;

// Re-export commonly used error types for convenience
pub use error::{
    ArtifactError, CacheError, CallGraphError, ConfigError, CrossCheckError, OutputError,
    PerfLogError, TimingError,
};
