//! Loaders for the JSON artifacts emitted by the compiler passes.
//!
//! Every artifact is a JSON array of objects. Records keyed by a site `ID`
//! are indexed in file order; a repeated `ID` means the artifact is corrupt.

use super::schema::{CallGraphNode, InstrRecord, StaticRecord};
use crate::utils::error::ArtifactError;
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::info;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read a JSON array artifact into typed records
///
/// **Public** - generic loader shared by the typed helpers below
pub fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let records: Vec<T> = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        ArtifactError::InvalidJson {
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!("<< read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Load a call graph artifact (`<suite>.cg.json`)
pub fn load_call_graph(path: &Path) -> Result<Vec<CallGraphNode>, ArtifactError> {
    read_json_array(path)
}

/// Load static analysis results (`<suite>.cilkfor.json`) keyed by site ID
pub fn load_static_analysis(path: &Path) -> Result<IndexMap<String, StaticRecord>, ArtifactError> {
    let records: Vec<StaticRecord> = read_json_array(path)?;
    index_by_id(records, "static analysis", |r| &r.id)
}

/// Load instrumentation results (`<suite>.instr.json`) keyed by site ID
pub fn load_instrumentation(path: &Path) -> Result<IndexMap<String, InstrRecord>, ArtifactError> {
    let records: Vec<InstrRecord> = read_json_array(path)?;
    index_by_id(records, "instrumentation", |r| &r.id)
}

/// Index records by ID, preserving file order
///
/// **Public** - used directly by tests and in-memory callers
pub fn index_by_id<T>(
    records: Vec<T>,
    artifact: &'static str,
    id_of: impl Fn(&T) -> &String,
) -> Result<IndexMap<String, T>, ArtifactError> {
    let mut indexed = IndexMap::with_capacity(records.len());

    for record in records {
        match indexed.entry(id_of(&record).clone()) {
            Entry::Occupied(entry) => {
                return Err(ArtifactError::DuplicateId {
                    artifact,
                    id: entry.key().clone(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(record);
            }
        }
    }

    Ok(indexed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::Prr;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn static_record(id: &str, prr: Prr) -> StaticRecord {
        StaticRecord {
            id: id.to_string(),
            prr,
        }
    }

    #[test]
    fn test_index_preserves_order() {
        let indexed = index_by_id(
            vec![static_record("b", Prr::Both), static_record("a", Prr::Defef)],
            "static analysis",
            |r| &r.id,
        )
        .unwrap();

        let ids: Vec<&String> = indexed.keys().collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_index_rejects_duplicates() {
        let result = index_by_id(
            vec![static_record("a", Prr::Both), static_record("a", Prr::Defef)],
            "static analysis",
            |r| &r.id,
        );
        assert!(matches!(result, Err(ArtifactError::DuplicateId { id, .. }) if id == "a"));
    }

    #[test]
    fn test_load_static_analysis_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"ID": "s1", "prr": "defdac"}}, {{"ID": "s2", "prr": "untouched"}}]"#
        )
        .unwrap();

        let records = load_static_analysis(file.path()).unwrap();
        assert_eq!(records["s1"].prr, Prr::Defdac);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_invalid_json_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = load_call_graph(file.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidJson { .. }));
    }
}
