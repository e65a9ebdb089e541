//! pfor-triage
//!
//! Triage of parallel-loop conversions for eager-future (EF) versus
//! divide-and-conquer (DAC) execution in benchmark suites.
//!
//! This crate provides the core implementation for the
//! `pfor-triage` CLI tool:
//!
//! - [`callgraph`] indexes compiler call graphs and unfolds bounded call histories
//! - [`crosscheck`] merges static labels with instrumentation counts
//! - [`aggregator`] streams runtime perf logs into per-callsite statistics
//! - [`timing`] compares control and experiment timing runs
//!
//! ## Getting Started
//!
//! ```bash
//! pfor-triage --test wordCounts --analysis --profile --verbose
//! pfor-triage --help
//! ```

pub mod aggregator;
pub mod callgraph;
pub mod commands;
pub mod crosscheck;
pub mod output;
pub mod parser;
pub mod timing;
pub mod utils;
