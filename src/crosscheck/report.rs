//! Provenance report for notable cross-check verdicts.
//!
//! For every site whose verdict is worth a second look, each instrumented
//! caller that backs the verdict is listed with the unfolded static call
//! history leading to it.

use super::merge::CrossCheck;
use super::verdict::Evidence;
use crate::callgraph::PathEnumerator;
use crate::parser::schema::InstrCaller;
use crate::utils::paths::PathNormalizer;
use std::fmt::Write;

/// Render the provenance report
///
/// **Public** - printed by the analysis command in verbose mode
pub fn render_provenance(
    check: &CrossCheck,
    enumerator: &PathEnumerator<'_>,
    normalizer: &PathNormalizer,
) -> String {
    let mut out = String::new();

    for site in check.sites.iter().filter(|site| site.verdict.is_notable()) {
        let record = &site.record.record;
        let _ = writeln!(out, "\t{}: {}", site.verdict, record.id);

        match site.verdict.evidence() {
            Evidence::Ef => write_callers(&mut out, &record.caller_ef, None, enumerator, normalizer),
            Evidence::Dac => {
                write_callers(&mut out, &record.caller_dac, None, enumerator, normalizer)
            }
            Evidence::EfAndDac => {
                write_callers(&mut out, &record.caller_ef, Some("ef"), enumerator, normalizer);
                write_callers(&mut out, &record.caller_dac, Some("dac"), enumerator, normalizer);
            }
            Evidence::None => {}
        }
    }

    out
}

fn write_callers(
    out: &mut String,
    callers: &[InstrCaller],
    marker: Option<&str>,
    enumerator: &PathEnumerator<'_>,
    normalizer: &PathNormalizer,
) {
    for caller in callers {
        let _ = writeln!(
            out,
            "\t\t{}:{}:{}{}\tcaller: {}\tmangled: {}",
            normalizer.normalize(&caller.file),
            caller.ln,
            caller.col,
            marker.map(|m| format!(" {}", m)).unwrap_or_default(),
            caller.caller,
            caller.mangled_name
        );

        let history = enumerator.enumerate(&caller.mangled_name);
        for path in history.iter() {
            let _ = writeln!(out, "\t- [ ] --\n{}", path);
        }
        if history.truncated {
            let _ = writeln!(
                out,
                "\t<!> only show {} callpaths due to space!",
                enumerator.limit()
            );
        }
        out.push('\n');
    }
}
