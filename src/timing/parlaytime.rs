//! Parser for benchmark wall-clock timing logs.
//!
//! A log is a sequence of blank-line separated runs:
//!
//! ```text
//! == CILK_WORKERS = 8 ==
//! Parlay time: 0.1234
//! Parlay time: 0.1198
//! ```

use crate::utils::error::TimingError;
use log::debug;
use regex::Regex;

/// Timing statistics for one worker count
#[derive(Debug, Clone, PartialEq)]
pub struct TimingRow {
    pub workers: u32,
    pub mean: f64,
    /// Sample standard deviation; absent for a single round
    pub std_dev: Option<f64>,
}

/// All runs of one timing log
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimingTable {
    pub rows: Vec<TimingRow>,
    /// Rounds per run, identical across runs
    pub rounds: usize,
}

/// Parse a timing log
///
/// **Public** - main entry point
///
/// # Errors
/// * `TimingError::RoundMismatch` - runs disagree on the number of rounds
/// * `TimingError::InvalidValue` - a marker or time does not parse
/// * `TimingError::NoRuns` - no run carried a worker marker and times
pub fn parse_parlaytime_log(text: &str) -> Result<TimingTable, TimingError> {
    let marker = Regex::new(r"^== CILK_WORKERS = (\d+)")?;
    let time = Regex::new(r"^Parlay time:\s*(\d+(?:\.\d+)?)")?;

    let mut chunks: Vec<&str> = text.split("\n\n").collect();
    // Don't treat the empty tail before EOF as a run
    if chunks.last().is_some_and(|chunk| chunk.trim().is_empty()) {
        chunks.pop();
    }

    let mut table = TimingTable::default();
    for chunk in chunks {
        let Some(workers) = chunk.lines().find_map(|line| marker.captures(line)) else {
            debug!("Skipping run without worker marker");
            continue;
        };
        let workers: u32 = workers[1]
            .parse()
            .map_err(|_| TimingError::InvalidValue(workers[1].to_string()))?;

        let times = chunk
            .lines()
            .filter_map(|line| time.captures(line))
            .map(|caps| {
                caps[1]
                    .parse::<f64>()
                    .map_err(|_| TimingError::InvalidValue(caps[1].to_string()))
            })
            .collect::<Result<Vec<f64>, TimingError>>()?;

        if times.is_empty() {
            debug!("Skipping run for {} workers without timings", workers);
            continue;
        }

        if table.rows.is_empty() {
            table.rounds = times.len();
        } else if table.rounds != times.len() {
            return Err(TimingError::RoundMismatch {
                workers,
                expected: table.rounds,
                found: times.len(),
            });
        }

        table.rows.push(TimingRow {
            workers,
            mean: mean(&times),
            std_dev: sample_std_dev(&times),
        });
    }

    if table.rows.is_empty() {
        return Err(TimingError::NoRuns);
    }
    Ok(table)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
