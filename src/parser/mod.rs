//! Artifact parsing and schema definitions.
//!
//! This module handles:
//! - Defining the JSON schema of every compiler artifact
//! - Loading artifacts from disk
//! - Indexing records by site ID

pub mod artifacts;
pub mod schema;

// Re-export main types
pub use artifacts::{
    index_by_id, load_call_graph, load_instrumentation, load_static_analysis, read_json_array,
};
pub use schema::{CallGraphNode, Callsite, InstrCaller, InstrRecord, MergedRecord, Prr, StaticRecord};
