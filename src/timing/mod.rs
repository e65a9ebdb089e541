//! Control-vs-experiment comparison of timing and i-cache measurements.
//!
//! Both groups are parsed separately and joined on worker count; only worker
//! counts present in both groups appear in the output.

pub mod icache;
pub mod parlaytime;

pub use icache::{parse_icache_report, IcacheRow};
pub use parlaytime::{parse_parlaytime_log, TimingRow, TimingTable};

use crate::utils::error::TimingError;
use serde::Serialize;

/// One CSV row of the timing comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingComparisonRow {
    pub cilk_workers: u32,
    pub avg_parlaytime_orig: f64,
    pub std_parlaytime_orig: Option<f64>,
    pub avg_parlaytime_test: f64,
    pub std_parlaytime_test: Option<f64>,
}

/// One CSV row of the i-cache comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IcacheComparisonRow {
    pub cilk_workers: u32,
    #[serde(rename = "i$_miss_orig")]
    pub miss_orig: u64,
    #[serde(rename = "i$_hit_orig")]
    pub hit_orig: u64,
    #[serde(rename = "i$_miss_rate_orig")]
    pub miss_rate_orig: f64,
    #[serde(rename = "i$_miss_test")]
    pub miss_test: u64,
    #[serde(rename = "i$_hit_test")]
    pub hit_test: u64,
    #[serde(rename = "i$_miss_rate_test")]
    pub miss_rate_test: f64,
}

/// Join control and experiment timings on worker count
///
/// # Errors
/// * `TimingError::GroupRoundMismatch` - the groups ran a different number of rounds
pub fn compare_timings(
    control: &TimingTable,
    experiment: &TimingTable,
) -> Result<Vec<TimingComparisonRow>, TimingError> {
    if control.rounds != experiment.rounds {
        return Err(TimingError::GroupRoundMismatch {
            control: control.rounds,
            experiment: experiment.rounds,
        });
    }

    Ok(control
        .rows
        .iter()
        .filter_map(|orig| {
            let test = experiment.rows.iter().find(|row| row.workers == orig.workers)?;
            Some(TimingComparisonRow {
                cilk_workers: orig.workers,
                avg_parlaytime_orig: orig.mean,
                std_parlaytime_orig: orig.std_dev,
                avg_parlaytime_test: test.mean,
                std_parlaytime_test: test.std_dev,
            })
        })
        .collect())
}

/// Join control and experiment i-cache counters on worker count
pub fn compare_icache(control: &[IcacheRow], experiment: &[IcacheRow]) -> Vec<IcacheComparisonRow> {
    control
        .iter()
        .filter_map(|orig| {
            let test = experiment.iter().find(|row| row.workers == orig.workers)?;
            Some(IcacheComparisonRow {
                cilk_workers: orig.workers,
                miss_orig: orig.misses,
                hit_orig: orig.hits,
                miss_rate_orig: orig.miss_rate,
                miss_test: test.misses,
                hit_test: test.hits,
                miss_rate_test: test.miss_rate,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rounds: usize, workers: &[u32]) -> TimingTable {
        TimingTable {
            rows: workers
                .iter()
                .map(|w| TimingRow {
                    workers: *w,
                    mean: 1.0 / *w as f64,
                    std_dev: None,
                })
                .collect(),
            rounds,
        }
    }

    #[test]
    fn test_inner_join_on_workers() {
        let rows = compare_timings(&table(3, &[1, 2, 4]), &table(3, &[4, 1])).unwrap();
        let workers: Vec<u32> = rows.iter().map(|r| r.cilk_workers).collect();
        assert_eq!(workers, vec![1, 4]);
        assert_eq!(rows[1].avg_parlaytime_test, 0.25);
    }

    #[test]
    fn test_round_counts_must_match() {
        assert!(matches!(
            compare_timings(&table(3, &[1]), &table(5, &[1])),
            Err(TimingError::GroupRoundMismatch { control: 3, experiment: 5 })
        ));
    }

    #[test]
    fn test_icache_join() {
        let rows = compare_icache(
            &[IcacheRow::new(1, 10, 90), IcacheRow::new(2, 5, 5)],
            &[IcacheRow::new(2, 1, 3)],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].miss_rate_orig, 0.5);
        assert_eq!(rows[0].miss_rate_test, 0.25);
    }
}
