//! Per-callsite accumulators and the serializable aggregation result.
//!
//! Accumulators are keyed by `(host, intrinsic version, inline location)`.
//! Every activation bumps exactly one of `ef_entry`/`dac_entry` along with
//! `entry`, so `ef_entry + dac_entry == entry` holds for every key.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Which variant of the parallel-loop construct was instrumented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntrinsicVersion {
    #[serde(rename = "0")]
    Baseline,
    #[serde(rename = "1")]
    Ef,
    #[serde(rename = "2")]
    Dac,
}

impl IntrinsicVersion {
    pub const ALL: [IntrinsicVersion; 3] = [
        IntrinsicVersion::Baseline,
        IntrinsicVersion::Ef,
        IntrinsicVersion::Dac,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(IntrinsicVersion::Baseline),
            1 => Some(IntrinsicVersion::Ef),
            2 => Some(IntrinsicVersion::Dac),
            _ => None,
        }
    }

    /// Name of the runtime entry point for this version
    pub fn intrinsic_name(&self) -> &'static str {
        match self {
            IntrinsicVersion::Baseline => "parallel_for",
            IntrinsicVersion::Ef => "parallel_for_ef",
            IntrinsicVersion::Dac => "parallel_for_dac",
        }
    }

    /// Short section label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            IntrinsicVersion::Baseline => "orig",
            IntrinsicVersion::Ef => "ef",
            IntrinsicVersion::Dac => "dac",
        }
    }
}

/// Running statistics for one `(host, version, inline location)` key
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerfAccumulator {
    #[serde(rename = "inline_loc")]
    pub inline_location: String,

    #[serde(rename = "entry")]
    pub entry_count: u64,

    #[serde(rename = "ef_entry")]
    pub eager_entry_count: u64,

    #[serde(rename = "dac_entry")]
    pub dac_entry_count: u64,

    pub tripcount_sum: f64,
    pub granularity_sum: f64,
    pub depth_sum: f64,
}

impl PerfAccumulator {
    pub fn new(inline_location: impl Into<String>) -> Self {
        Self {
            inline_location: inline_location.into(),
            ..Default::default()
        }
    }

    /// Fold one activation into the running sums
    pub fn record(&mut self, tripcount: u64, granularity: u64, depth: u32) {
        self.entry_count += 1;
        if depth == 0 {
            self.eager_entry_count += 1;
        } else {
            self.dac_entry_count += 1;
        }
        self.tripcount_sum += tripcount as f64;
        self.granularity_sum += granularity as f64;
        self.depth_sum += depth as f64;
    }

    pub fn avg_tripcount(&self) -> f64 {
        self.mean(self.tripcount_sum)
    }

    pub fn avg_granularity(&self) -> f64 {
        self.mean(self.granularity_sum)
    }

    pub fn avg_depth(&self) -> f64 {
        self.mean(self.depth_sum)
    }

    pub fn is_consistent(&self) -> bool {
        self.eager_entry_count + self.dac_entry_count == self.entry_count
    }

    fn mean(&self, sum: f64) -> f64 {
        if self.entry_count == 0 {
            0.0
        } else {
            sum / self.entry_count as f64
        }
    }
}

/// Callers of a host's parallel loop, split by invocation style
///
/// Maps caller linkage name to the set of call-site locations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallerMap {
    pub ef: BTreeMap<String, BTreeSet<String>>,
    pub dac: BTreeMap<String, BTreeSet<String>>,
}

impl CallerMap {
    /// Depth 0 is an eager-future invocation, anything deeper is DAC recursion
    pub fn record(&mut self, caller: &str, location: &str, depth: u32) {
        let side = if depth == 0 { &mut self.ef } else { &mut self.dac };
        side.entry(caller.to_string())
            .or_default()
            .insert(location.to_string());
    }
}

/// Everything accumulated for one host function while scanning
#[derive(Debug, Clone, Default)]
pub(crate) struct HostState {
    pub accumulators: HashMap<(IntrinsicVersion, String), PerfAccumulator>,
    pub origin_locations: BTreeSet<String>,
    pub callers: CallerMap,
}

impl HostState {
    /// Get the accumulator for a key, inserting a zeroed one on first use
    pub fn accumulator_mut(
        &mut self,
        version: IntrinsicVersion,
        inline_location: &str,
    ) -> &mut PerfAccumulator {
        self.accumulators
            .entry((version, inline_location.to_string()))
            .or_insert_with(|| PerfAccumulator::new(inline_location))
    }

    pub fn into_profile(self) -> HostProfile {
        let mut versions: BTreeMap<IntrinsicVersion, Vec<PerfAccumulator>> = BTreeMap::new();
        for ((version, _), accumulator) in self.accumulators {
            versions.entry(version).or_default().push(accumulator);
        }
        for accumulators in versions.values_mut() {
            accumulators.sort_by(|a, b| {
                a.entry_count
                    .cmp(&b.entry_count)
                    .then_with(|| a.inline_location.cmp(&b.inline_location))
            });
        }

        let flatten = |map: BTreeMap<String, BTreeSet<String>>| {
            map.into_iter()
                .map(|(caller, locations)| (caller, locations.into_iter().collect()))
                .collect()
        };

        HostProfile {
            versions,
            origloc: self.origin_locations.into_iter().collect(),
            ef_callers: flatten(self.callers.ef),
            dac_callers: flatten(self.callers.dac),
        }
    }
}

/// Aggregated statistics for one host function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostProfile {
    /// Accumulators per intrinsic version, ascending by entry count.
    /// Serialized inline as `"0"`, `"1"` and `"2"` keys of the host object.
    #[serde(flatten)]
    pub versions: BTreeMap<IntrinsicVersion, Vec<PerfAccumulator>>,

    /// Original definition locations of the host's parallel loops
    pub origloc: Vec<String>,

    pub ef_callers: BTreeMap<String, Vec<String>>,
    pub dac_callers: BTreeMap<String, Vec<String>>,
}

impl HostProfile {
    pub fn accumulators(&self, version: IntrinsicVersion) -> &[PerfAccumulator] {
        self.versions.get(&version).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Aggregation result: host function -> profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerfSummary {
    pub hosts: BTreeMap<String, HostProfile>,
}

impl PerfSummary {
    pub fn host(&self, name: &str) -> Option<&HostProfile> {
        self.hosts.get(name)
    }

    /// `(host, accumulator)` pairs for one version, ascending by entry count
    pub fn by_version(&self, version: IntrinsicVersion) -> Vec<(&str, &PerfAccumulator)> {
        let mut entries: Vec<(&str, &PerfAccumulator)> = self
            .hosts
            .iter()
            .flat_map(|(host, profile)| {
                profile
                    .accumulators(version)
                    .iter()
                    .map(move |acc| (host.as_str(), acc))
            })
            .collect();
        entries.sort_by_key(|(_, acc)| acc.entry_count);
        entries
    }
}
