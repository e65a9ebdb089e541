//! Plain-text profiling report.
//!
//! One section per intrinsic version lists every accumulator in ascending
//! entry order, followed by a section with the recorded callers of each host.
//! With [`CallHistory`] supplied, locations outside the significant files are
//! annotated with their unfolded call history.

use crate::aggregator::{HostProfile, IntrinsicVersion, PerfAccumulator, PerfSummary};
use crate::callgraph::{MajorBoundary, PathEnumerator};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Call history annotation used by verbose reports
pub struct CallHistory<'a> {
    pub enumerator: &'a PathEnumerator<'a>,
    pub boundary: &'a MajorBoundary,
}

impl CallHistory<'_> {
    /// Unfolded paths separated by blank lines, with a notice when capped
    pub fn unfold(&self, function: &str) -> String {
        let paths = self.enumerator.enumerate(function);
        let mut text = paths.iter().collect::<Vec<_>>().join("\n\n");
        if paths.truncated {
            let _ = write!(
                text,
                "\n\n{}<!> only {} callpaths is shown!",
                "\t".repeat(self.enumerator.indent()),
                self.enumerator.limit()
            );
        }
        text
    }
}

/// Render the profiling report
///
/// **Public** - main entry point
///
/// # Arguments
/// * `summary` - Aggregated perf-log statistics
/// * `history` - Call history annotation, `None` for the terse report
pub fn render_profile_report(summary: &PerfSummary, history: Option<&CallHistory<'_>>) -> String {
    let mut out = String::new();

    for version in IntrinsicVersion::ALL {
        let _ = writeln!(out, "-- {}: ", version.label());
        for (host, accumulator) in summary.by_version(version) {
            if let Some(profile) = summary.host(host) {
                write_accumulator(&mut out, version, host, profile, accumulator, history);
            }
        }
    }

    let _ = writeln!(out, "-- callers: ");
    for (host, profile) in &summary.hosts {
        if profile.ef_callers.is_empty() && profile.dac_callers.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\t{}", host);
        write_callers(&mut out, "ef", &profile.ef_callers, history);
        write_callers(&mut out, "dac", &profile.dac_callers, history);
        out.push('\n');
    }

    out
}

fn write_accumulator(
    out: &mut String,
    version: IntrinsicVersion,
    host: &str,
    profile: &HostProfile,
    accumulator: &PerfAccumulator,
    history: Option<&CallHistory<'_>>,
) {
    let _ = writeln!(
        out,
        "\t<{}> entry:{} ef:{} dac:{} avg.tc:{:.2} avg.gran:{:.2} avg.depth:{:.2}\tcaller: {}",
        version.intrinsic_name(),
        accumulator.entry_count,
        accumulator.eager_entry_count,
        accumulator.dac_entry_count,
        accumulator.avg_tripcount(),
        accumulator.avg_granularity(),
        accumulator.avg_depth(),
        host
    );
    for location in &profile.origloc {
        let _ = writeln!(out, "\t\tsource code at: {}", location);
    }
    let _ = writeln!(out, "\t\tinlined at: {}", accumulator.inline_location);

    if let Some(history) = history {
        let file = accumulator
            .inline_location
            .split(':')
            .next()
            .unwrap_or_default();
        if !history.boundary.is_major_file(file) {
            let _ = writeln!(out, "\t\tinline caller: {}", host);
            let _ = writeln!(out, "{}", history.unfold(host));
        }
    }
    out.push('\n');
}

fn write_callers(
    out: &mut String,
    kind: &str,
    callers: &BTreeMap<String, Vec<String>>,
    history: Option<&CallHistory<'_>>,
) {
    for (caller, locations) in callers {
        let _ = writeln!(out, "\t\t{} caller: {}", kind, caller);
        for location in locations {
            let _ = writeln!(out, "\t\t\tcalled at: {}", location);
        }
        if let Some(history) = history {
            let _ = writeln!(out, "{}", history.unfold(caller));
        }
    }
}
