//! Profiling report command implementation.
//!
//! The profile command:
//! 1. Reuses the side-car cache if the policy allows it
//! 2. Otherwise streams the perf log through the aggregator and refreshes the cache
//! 3. Renders the report, unfolding call histories in verbose mode
//! 4. Prints the report and writes it next to the log

use super::analysis::artifact_path;
use crate::aggregator::cache::{lookup, write_cache};
use crate::aggregator::{
    CachePolicy, CachedSummary, LogSource, PerfLogAggregator, PerfSummary, ProgressReporter,
    SourceFingerprint,
};
use crate::callgraph::{CallGraphIndex, EdgeStyle, MajorBoundary, PathEnumerator};
use crate::output::{render_profile_report, write_text, CallHistory};
use crate::parser::load_call_graph;
use crate::utils::config::{
    PERF_CACHE_SUFFIX, PERF_CALL_GRAPH_SUFFIX, PERF_LOG_SUFFIX, PERF_REPORT_SUFFIX,
};
use crate::utils::paths::PathNormalizer;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Arguments for the profile command
#[derive(Debug, Clone)]
pub struct ProfileArgs {
    /// Directory holding the perf log and the profiling call graph
    pub workdir: PathBuf,

    pub test: String,

    /// Annotate locations with unfolded call histories
    pub verbose: bool,

    pub path_limit: usize,

    pub cache_policy: CachePolicy,

    /// Source file basenames that end unfolding
    pub major_files: Vec<String>,

    /// Function names that end unfolding
    pub major_functions: Vec<String>,

    pub normalizer: PathNormalizer,
}

impl ProfileArgs {
    fn artifact(&self, suffix: &str) -> PathBuf {
        artifact_path(&self.workdir, &self.test, suffix)
    }
}

/// Execute the profile command
///
/// **Public** - main entry point called from the run dispatcher
///
/// # Returns
/// The aggregated statistics the report was rendered from
///
/// # Errors
/// * Neither a perf log nor a usable cache exists
/// * Malformed perf log lines
/// * Unreadable profiling call graph (verbose only)
/// * File write errors
pub fn execute_profile(args: &ProfileArgs) -> Result<PerfSummary> {
    let start_time = Instant::now();
    let summary = load_summary(args)?;
    info!(
        "Aggregated {} hosts in {:.2}s",
        summary.hosts.len(),
        start_time.elapsed().as_secs_f64()
    );

    let report = if args.verbose {
        let nodes = load_call_graph(&args.artifact(PERF_CALL_GRAPH_SUFFIX))
            .context("Failed to load profiling call graph")?;
        let index = CallGraphIndex::from_nodes_normalized(nodes, &args.normalizer)
            .context("Failed to index profiling call graph")?;
        let boundary = MajorBoundary::new(&args.major_files, &args.major_functions);
        let enumerator = PathEnumerator::new(&index)
            .with_boundary(&boundary)
            .with_style(EdgeStyle::Arrow)
            .with_limit(args.path_limit)
            .with_indent(2);
        let history = CallHistory {
            enumerator: &enumerator,
            boundary: &boundary,
        };
        render_profile_report(&summary, Some(&history))
    } else {
        render_profile_report(&summary, None)
    };

    println!("{}", report);
    write_text(&report, args.artifact(PERF_REPORT_SUFFIX)).context("Failed to write report")?;

    Ok(summary)
}

/// Reuse the cache or rescan the log
///
/// **Private** - internal helper for execute_profile
fn load_summary(args: &ProfileArgs) -> Result<PerfSummary> {
    let log_path = args.artifact(PERF_LOG_SUFFIX);
    let cache_path = args.artifact(PERF_CACHE_SUFFIX);
    let log_exists = log_path.exists();

    // Only Verify compares fingerprints before a rescan
    let mut fingerprint = None;
    if log_exists && args.cache_policy == CachePolicy::Verify && cache_path.exists() {
        fingerprint = Some(fingerprint_of(&log_path)?);
    }

    if let Some(summary) = lookup(&cache_path, args.cache_policy, fingerprint.as_ref()) {
        return Ok(summary);
    }

    if !log_exists {
        anyhow::bail!(
            "No perf log at {} and no usable cache at {}",
            log_path.display(),
            cache_path.display()
        );
    }
    let fingerprint = match fingerprint {
        Some(fingerprint) => fingerprint,
        None => fingerprint_of(&log_path)?,
    };

    let summary = scan_log(&log_path)?;

    let cached = CachedSummary::new(summary, Some(fingerprint));
    if let Err(e) = write_cache(&cache_path, &cached) {
        warn!("Failed to write cache {}: {}", cache_path.display(), e);
    }
    Ok(cached.summary)
}

fn fingerprint_of(path: &Path) -> Result<SourceFingerprint> {
    let fingerprint = SourceFingerprint::of_file(path)
        .with_context(|| format!("Failed to hash {}", path.display()))?;
    debug!("{} sha256 {}", path.display(), fingerprint.sha256);
    Ok(fingerprint)
}

/// Stream the log through the aggregator
///
/// **Public** - usable without the cache or report
pub fn scan_log(path: &Path) -> Result<PerfSummary> {
    let source =
        LogSource::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut progress = ProgressReporter::new(source.counter.clone(), source.total_bytes);

    let mut aggregator = PerfLogAggregator::new();
    aggregator
        .consume(source.reader, || progress.tick())
        .with_context(|| format!("Failed to aggregate {}", path.display()))?;
    progress.finish();

    info!(
        "Scanned {} lines for {} hosts",
        aggregator.lines_processed(),
        aggregator.host_count()
    );
    Ok(aggregator.finish())
}
