//! Matching instrumentation records to static analysis records.
//!
//! Both artifacts come from the same compiler run, so every instrumented site
//! must have a static record. Label/count disagreements are diagnostics only.

use super::verdict::Verdict;
use crate::parser::schema::{InstrRecord, MergedRecord, Prr, StaticRecord};
use crate::utils::error::CrossCheckError;
use indexmap::IndexMap;
use log::debug;
use std::collections::BTreeMap;

/// One merged site with its consistency verdict
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedSite {
    pub record: MergedRecord,
    pub verdict: Verdict,
}

impl CheckedSite {
    pub fn id(&self) -> &str {
        &self.record.record.id
    }

    pub fn prr(&self) -> Prr {
        self.record.prr
    }
}

/// Result of a cross-check, in instrumentation file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossCheck {
    pub sites: Vec<CheckedSite>,
}

impl CrossCheck {
    /// Merged records for the combined JSON artifact
    pub fn merged(&self) -> Vec<&MergedRecord> {
        self.sites.iter().map(|site| &site.record).collect()
    }

    pub fn violations(&self) -> impl Iterator<Item = &CheckedSite> {
        self.sites.iter().filter(|site| site.verdict.is_violation())
    }

    pub fn with_prr(&self, prr: Prr) -> impl Iterator<Item = &CheckedSite> {
        self.sites.iter().filter(move |site| site.prr() == prr)
    }

    pub fn prr_counts(&self) -> BTreeMap<Prr, usize> {
        prr_counts(self.sites.iter().map(CheckedSite::prr))
    }
}

/// Count labels, listing every label even when its count is zero
pub fn prr_counts(labels: impl IntoIterator<Item = Prr>) -> BTreeMap<Prr, usize> {
    let mut counts: BTreeMap<Prr, usize> = Prr::ALL.iter().map(|prr| (*prr, 0)).collect();
    for prr in labels {
        *counts.entry(prr).or_default() += 1;
    }
    counts
}

/// Merge instrumentation with static analysis and classify every site
///
/// **Public** - main entry point
///
/// Verdicts are only logged at debug level here. Callers decide whether
/// violations are surfaced as warnings.
///
/// # Errors
/// * `CrossCheckError::UnmatchedSites` - instrumented IDs with no static record
pub fn cross_check(
    statics: &IndexMap<String, StaticRecord>,
    instrumented: IndexMap<String, InstrRecord>,
) -> Result<CrossCheck, CrossCheckError> {
    let unmatched: Vec<String> = instrumented
        .keys()
        .filter(|id| !statics.contains_key(*id))
        .cloned()
        .collect();
    if !unmatched.is_empty() {
        return Err(CrossCheckError::UnmatchedSites(unmatched));
    }

    let mut sites = Vec::with_capacity(instrumented.len());
    for (id, mut record) in instrumented {
        let prr = statics[&id].prr;
        let verdict = Verdict::classify(prr, record.ef, record.dac);

        debug!(
            "{}: {} labeled {} ran ef={} dac={}",
            verdict, id, prr, record.ef, record.dac
        );

        // The static label replaces any stale one carried by the record
        record.extra.remove("prr");
        sites.push(CheckedSite {
            record: MergedRecord { record, prr },
            verdict,
        });
    }

    Ok(CrossCheck { sites })
}
