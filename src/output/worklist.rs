//! Manual-conversion worklist.
//!
//! Lists every site whose static label commits it to a single strategy,
//! eager-future sites first, then DAC sites, each with the instrumented
//! callers that reached it and their unfolded call histories as checkboxes.

use crate::callgraph::PathEnumerator;
use crate::crosscheck::{CheckedSite, CrossCheck};
use crate::parser::schema::{InstrCaller, Prr};
use crate::utils::paths::PathNormalizer;
use std::fmt::Write;

const SITE_RULE: &str = "- [ ] ======================================";

/// Render the worklist text
///
/// **Public** - main entry point
///
/// # Arguments
/// * `check` - Cross-checked sites, in artifact order
/// * `enumerator` - Configured call path enumerator for caller histories
/// * `normalizer` - Applied to caller file paths
pub fn render_worklist(
    check: &CrossCheck,
    enumerator: &PathEnumerator<'_>,
    normalizer: &PathNormalizer,
) -> String {
    let mut out = String::from("worklist: \n");

    for site in check.with_prr(Prr::Defef) {
        write_site(&mut out, site, Prr::Defef, enumerator, normalizer);
    }
    for site in check.with_prr(Prr::Defdac) {
        write_site(&mut out, site, Prr::Defdac, enumerator, normalizer);
    }

    out
}

fn write_site(
    out: &mut String,
    site: &CheckedSite,
    prr: Prr,
    enumerator: &PathEnumerator<'_>,
    normalizer: &PathNormalizer,
) {
    let record = &site.record.record;
    let _ = writeln!(out, "\n{}", SITE_RULE);
    let _ = writeln!(out, "\t{}", record.id);

    let callers = match prr {
        Prr::Defdac => &record.caller_dac,
        _ => &record.caller_ef,
    };
    for caller in callers {
        write_caller(out, caller, prr, normalizer);

        let history = enumerator.enumerate(&caller.mangled_name);
        for path in history.iter() {
            let _ = writeln!(out, "\n\t- [ ] --\n{}", path);
        }
        if history.truncated {
            let _ = writeln!(
                out,
                "\t<!> only show {} callpaths due to space!",
                enumerator.limit()
            );
        }
    }
}

fn write_caller(out: &mut String, caller: &InstrCaller, prr: Prr, normalizer: &PathNormalizer) {
    let location = format!(
        "{}:{}:{}",
        normalizer.normalize(&caller.file),
        caller.ln,
        caller.col
    );
    match prr {
        Prr::Defdac => {
            let _ = writeln!(
                out,
                "\tdac\t{}\tcaller: {}\t{}",
                location, caller.caller, caller.mangled_name
            );
        }
        _ => {
            let _ = writeln!(out, "\tef\t{}\tcaller: {}", location, caller.caller);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callgraph::CallGraphIndex;
    use crate::crosscheck::Verdict;
    use crate::parser::schema::{CallGraphNode, Callsite, InstrRecord, MergedRecord};
    use pretty_assertions::assert_eq;

    fn caller(name: &str) -> InstrCaller {
        InstrCaller {
            file: "./src/wc.C".to_string(),
            ln: 10,
            col: 4,
            caller: name.to_string(),
            mangled_name: format!("_Z{}", name),
        }
    }

    fn site(id: &str, prr: Prr, ef: Vec<InstrCaller>, dac: Vec<InstrCaller>) -> CheckedSite {
        CheckedSite {
            record: MergedRecord {
                record: InstrRecord {
                    id: id.to_string(),
                    ef: ef.len() as u64,
                    dac: dac.len() as u64,
                    caller_ef: ef,
                    caller_dac: dac,
                    extra: serde_json::Map::new(),
                },
                prr,
            },
            verdict: Verdict::Untouched,
        }
    }

    #[test]
    fn test_groups_and_formats_sites() {
        let index = CallGraphIndex::from_nodes(vec![CallGraphNode {
            linkage_name: "_Zcount".to_string(),
            callsites: vec![Callsite {
                file: "main.C".to_string(),
                line: 1,
                column: 2,
                category: Prr::Defef,
                caller_display_name: "main".to_string(),
                caller_linkage_name: "main".to_string(),
            }],
        }])
        .unwrap();
        let enumerator = PathEnumerator::new(&index);
        let check = CrossCheck {
            sites: vec![
                site("dac_site", Prr::Defdac, Vec::new(), vec![caller("split")]),
                site("shared", Prr::Both, vec![caller("x")], Vec::new()),
                site("ef_site", Prr::Defef, vec![caller("count")], Vec::new()),
            ],
        };

        let text = render_worklist(&check, &enumerator, &PathNormalizer::default());

        assert_eq!(
            text,
            "worklist: \n\
             \n- [ ] ======================================\n\
             \tef_site\n\
             \tef\tsrc/wc.C:10:4\tcaller: count\n\
             \n\t- [ ] --\ndefef  main.C:1:2\tcaller: main\n\
             \n- [ ] ======================================\n\
             \tdac_site\n\
             \tdac\tsrc/wc.C:10:4\tcaller: split\t_Zsplit\n\
             \n\t- [ ] --\n\n"
        );
    }
}
