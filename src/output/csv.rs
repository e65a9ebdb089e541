//! CSV writer for the timing comparison tables.

use super::json::prepare_output_path;
use crate::utils::error::OutputError;
use log::info;
use serde::Serialize;
use std::path::Path;

/// Write serializable rows to a CSV file with a header row
///
/// **Public** - main entry point for CSV output
///
/// Column names come from the row type's serde field names.
///
/// # Errors
/// * `OutputError::CsvFailed` - I/O or serialization error from the writer
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_csv<T: Serialize>(rows: &[T], output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    prepare_output_path(output_path)?;

    let mut writer = ::csv::Writer::from_path(output_path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(">> wrote {} rows to {}", rows.len(), output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::{IcacheComparisonRow, TimingComparisonRow};

    #[test]
    fn test_timing_header_and_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("perf/wc/3.ece2.r5.parlay.csv");
        let rows = vec![TimingComparisonRow {
            cilk_workers: 4,
            avg_parlaytime_orig: 1.5,
            std_parlaytime_orig: Some(0.25),
            avg_parlaytime_test: 1.25,
            std_parlaytime_test: None,
        }];

        write_csv(&rows, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "cilk_workers,avg_parlaytime_orig,std_parlaytime_orig,avg_parlaytime_test,std_parlaytime_test\n\
             4,1.5,0.25,1.25,\n"
        );
    }

    #[test]
    fn test_icache_column_names() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("icache.csv");
        let rows = vec![IcacheComparisonRow {
            cilk_workers: 1,
            miss_orig: 1,
            hit_orig: 3,
            miss_rate_orig: 0.25,
            miss_test: 0,
            hit_test: 4,
            miss_rate_test: 0.0,
        }];

        write_csv(&rows, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "cilk_workers,i$_miss_orig,i$_hit_orig,i$_miss_rate_orig,i$_miss_test,i$_hit_test,i$_miss_rate_test"
        );
    }
}
