//! JSON schema definitions for the compiler-produced artifacts.
//!
//! This module defines the structure of the call graph, static analysis and
//! instrumentation files we read, and of the merged file we write back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheduling classification of a parallel loop (or of one call edge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prr {
    /// Eager-future only
    Defef,
    /// Divide-and-conquer only
    Defdac,
    /// Both strategies are reachable
    Both,
    /// No parallel-loop analysis applied
    Untouched,
}

impl Prr {
    pub const ALL: [Prr; 4] = [Prr::Defef, Prr::Defdac, Prr::Both, Prr::Untouched];

    pub fn as_str(&self) -> &'static str {
        match self {
            Prr::Defef => "defef",
            Prr::Defdac => "defdac",
            Prr::Both => "both",
            Prr::Untouched => "untouched",
        }
    }
}

impl fmt::Display for Prr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call edge into a function: where it is called from and by whom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callsite {
    pub file: String,

    #[serde(rename = "ln")]
    pub line: u32,

    #[serde(rename = "col")]
    pub column: u32,

    /// Classification attached to this specific edge
    #[serde(rename = "prr")]
    pub category: Prr,

    #[serde(rename = "caller_name")]
    pub caller_display_name: String,

    #[serde(rename = "caller_mangled_name")]
    pub caller_linkage_name: String,
}

/// A function in the call graph together with the callsites that call it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallGraphNode {
    #[serde(rename = "func")]
    pub linkage_name: String,

    #[serde(default)]
    pub callsites: Vec<Callsite>,
}

/// Static analysis verdict for one parallel loop site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticRecord {
    #[serde(rename = "ID")]
    pub id: String,

    pub prr: Prr,
}

/// Runtime caller of an instrumented parallel loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrCaller {
    pub file: String,
    pub ln: u32,
    pub col: u32,
    pub caller: String,
    pub mangled_name: String,
}

/// Runtime instrumentation counts for one parallel loop site
///
/// Fields we do not interpret are kept in `extra` so the merged artifact
/// reproduces the record verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrRecord {
    #[serde(rename = "ID")]
    pub id: String,

    /// Eager-future entries observed
    pub ef: u64,

    /// Divide-and-conquer entries observed
    pub dac: u64,

    #[serde(rename = "caller_EF", default)]
    pub caller_ef: Vec<InstrCaller>,

    #[serde(rename = "caller_DAC", default)]
    pub caller_dac: Vec<InstrCaller>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Instrumentation record annotated with its static classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    #[serde(flatten)]
    pub record: InstrRecord,

    pub prr: Prr,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_callsite_field_names() {
        let callsite: Callsite = serde_json::from_value(json!({
            "file": "wc.C",
            "ln": 12,
            "col": 3,
            "prr": "defdac",
            "caller_name": "wordCounts",
            "caller_mangled_name": "_Z10wordCountsv"
        }))
        .unwrap();

        assert_eq!(callsite.line, 12);
        assert_eq!(callsite.category, Prr::Defdac);
        assert_eq!(callsite.caller_linkage_name, "_Z10wordCountsv");
    }

    #[test]
    fn test_merged_record_keeps_unknown_fields() {
        let record: InstrRecord = serde_json::from_value(json!({
            "ID": "site1",
            "ef": 2,
            "dac": 0,
            "caller_EF": [],
            "loc": "wc.C:4:1"
        }))
        .unwrap();
        assert!(record.caller_dac.is_empty());

        let merged = MergedRecord {
            record,
            prr: Prr::Defef,
        };
        let value = serde_json::to_value(&merged).unwrap();
        assert_eq!(value["loc"], "wc.C:4:1");
        assert_eq!(value["prr"], "defef");
        assert_eq!(value["ID"], "site1");
    }
}
