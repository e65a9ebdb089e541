//! Cross-check command implementation.
//!
//! The analysis command:
//! 1. Loads the call graph, static analysis and instrumentation artifacts
//! 2. Cross-checks instrumentation counts against the static labels
//! 3. Warns about violations and prints the provenance report (verbose only)
//! 4. Writes the merged JSON artifact and the worklist

use crate::callgraph::{CallGraphIndex, EdgeStyle, PathEnumerator};
use crate::crosscheck::{cross_check, prr_counts, render_provenance, CrossCheck};
use crate::output::{render_worklist, write_json, write_text};
use crate::parser::{load_call_graph, load_instrumentation, load_static_analysis};
use crate::utils::config::{
    CALL_GRAPH_SUFFIX, INSTRUMENTATION_SUFFIX, MERGED_SUFFIX, STATIC_ANALYSIS_SUFFIX,
    WORKLIST_SUFFIX,
};
use crate::utils::paths::PathNormalizer;
use anyhow::{Context, Result};
use log::{info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Arguments for the analysis command
#[derive(Debug, Clone)]
pub struct AnalysisArgs {
    /// Directory holding the compiler artifacts
    pub workdir: PathBuf,

    /// Artifact file name prefix
    pub test: String,

    /// Print the provenance report and linkage names
    pub verbose: bool,

    /// Maximum call paths unfolded per caller
    pub path_limit: usize,

    pub normalizer: PathNormalizer,
}

impl AnalysisArgs {
    fn artifact(&self, suffix: &str) -> PathBuf {
        artifact_path(&self.workdir, &self.test, suffix)
    }
}

/// Execute the analysis command
///
/// **Public** - main entry point called from the run dispatcher
///
/// # Returns
/// The cross-check result, after both output files are written
///
/// # Errors
/// * Unreadable or malformed artifacts
/// * Duplicate functions or site IDs
/// * Instrumented sites missing from the static analysis
/// * File write errors
pub fn execute_analysis(args: &AnalysisArgs) -> Result<CrossCheck> {
    let start_time = Instant::now();
    info!("Cross-checking {} in {}", args.test, args.workdir.display());

    let nodes = load_call_graph(&args.artifact(CALL_GRAPH_SUFFIX))
        .context("Failed to load call graph")?;
    let index = CallGraphIndex::from_nodes_normalized(nodes, &args.normalizer)
        .context("Failed to index call graph")?;

    let statics = load_static_analysis(&args.artifact(STATIC_ANALYSIS_SUFFIX))
        .context("Failed to load static analysis")?;
    log_counts("static analysis", &prr_counts(statics.values().map(|r| r.prr)));

    let instrumented = load_instrumentation(&args.artifact(INSTRUMENTATION_SUFFIX))
        .context("Failed to load instrumentation")?;

    let check = cross_check(&statics, instrumented)
        .context("Instrumentation and static analysis disagree on loop sites")?;
    log_counts("merged", &check.prr_counts());

    let enumerator = PathEnumerator::new(&index)
        .with_style(EdgeStyle::Classified {
            show_linkage: args.verbose,
        })
        .with_limit(args.path_limit)
        .with_indent(2);

    log_violations(&check, args.verbose);
    if args.verbose {
        println!("{}", render_provenance(&check, &enumerator, &args.normalizer));
    }

    write_json(&check.merged(), args.artifact(MERGED_SUFFIX))
        .context("Failed to write merged artifact")?;

    let worklist = render_worklist(&check, &enumerator, &args.normalizer);
    write_text(&worklist, args.artifact(WORKLIST_SUFFIX)).context("Failed to write worklist")?;

    info!(
        "Analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(check)
}

pub(crate) fn artifact_path(dir: &Path, test: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}{}", test, suffix))
}

fn log_counts<K: std::fmt::Display>(what: &str, counts: &BTreeMap<K, usize>) {
    info!("{}:", what);
    for (label, count) in counts {
        info!("\t{} {} cilkfors", count, label);
    }
}

/// Warn about label violations in verbose mode; returns the number reported
fn log_violations(check: &CrossCheck, verbose: bool) -> usize {
    if !verbose {
        return 0;
    }
    let mut reported = 0;
    for site in check.violations() {
        let record = &site.record.record;
        warn!(
            "{}: {} is labeled {} but ran ef={} dac={}",
            site.verdict,
            site.id(),
            site.prr(),
            record.ef,
            record.dac
        );
        reported += 1;
    }
    reported
}
