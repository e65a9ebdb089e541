//! Aggregation of the instrumentation perf log into per-callsite statistics.
//!
//! This module transforms a (possibly gzip-compressed) perf log into:
//! - Per-host, per-version, per-inline-location accumulators
//! - Per-host caller maps split into EF and DAC invocations
//! - A cacheable, serializable summary

pub mod accumulator;
pub mod cache;
pub mod perf_log;
pub mod source;

// Re-export main types and functions
pub use accumulator::{CallerMap, HostProfile, IntrinsicVersion, PerfAccumulator, PerfSummary};
pub use cache::{CachePolicy, CachedSummary, SourceFingerprint};
pub use perf_log::{aggregate_lines, parse_line, LogRecord, PerfLogAggregator};
pub use source::{LogSource, ProgressReporter};
