//! Timing comparison command implementation.
//!
//! Reads the control (`orig`) and experiment (`test`) timing logs and i-cache
//! reports of one experiment and writes the joined tables as CSV.

use crate::output::write_csv;
use crate::timing::{compare_icache, compare_timings, parse_icache_report, parse_parlaytime_log};
use crate::utils::config::{TIMING_DATA_DIR, TIMING_RESULT_DIR};
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

/// Arguments for the timing comparison command
#[derive(Debug, Clone)]
pub struct ParlaytimeArgs {
    /// Directory containing `data/` and `perf/`
    pub base_dir: PathBuf,

    pub test: String,

    /// Experiment identifier printed by the benchmark harness
    pub experiment_id: String,

    /// Cluster machine number, recorded in the output file names
    pub ece: u32,
}

/// Files written by the timing comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ParlaytimeOutputs {
    pub timing_csv: PathBuf,
    pub icache_csv: PathBuf,
}

impl ParlaytimeArgs {
    fn input(&self, name: &str) -> PathBuf {
        self.base_dir
            .join(TIMING_DATA_DIR)
            .join(&self.test)
            .join(format!("{}.{}", self.experiment_id, name))
    }

    fn output(&self, rounds: usize, kind: &str) -> PathBuf {
        self.base_dir
            .join(TIMING_RESULT_DIR)
            .join(&self.test)
            .join(format!(
                "{}.ece{}.r{}.{}.csv",
                self.experiment_id, self.ece, rounds, kind
            ))
    }
}

/// Execute the timing comparison command
///
/// **Public** - main entry point called from the run dispatcher
///
/// # Errors
/// * Missing or unreadable input logs
/// * Inconsistent round counts within a log or between groups
/// * File write errors
pub fn execute_parlaytime(args: &ParlaytimeArgs) -> Result<ParlaytimeOutputs> {
    info!(
        "Comparing timings of experiment {} for {}",
        args.experiment_id, args.test
    );

    let control = parse_parlaytime_log(&read_input(&args.input("parlaytime.orig.log"))?)
        .context("Failed to parse control timing log")?;
    let experiment = parse_parlaytime_log(&read_input(&args.input("parlaytime.test.log"))?)
        .context("Failed to parse experiment timing log")?;
    let icache_control = parse_icache_report(&read_input(&args.input("icache.orig.txt"))?)
        .context("Failed to parse control i-cache report")?;
    let icache_experiment = parse_icache_report(&read_input(&args.input("icache.test.txt"))?)
        .context("Failed to parse experiment i-cache report")?;

    let timing_rows = compare_timings(&control, &experiment)?;
    let icache_rows = compare_icache(&icache_control, &icache_experiment);

    let outputs = ParlaytimeOutputs {
        timing_csv: args.output(control.rounds, "parlay"),
        icache_csv: args.output(control.rounds, "icache"),
    };
    write_csv(&timing_rows, &outputs.timing_csv).context("Failed to write timing CSV")?;
    write_csv(&icache_rows, &outputs.icache_csv).context("Failed to write i-cache CSV")?;

    Ok(outputs)
}

fn read_input(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    info!("<< read {}", path.display());
    Ok(text)
}
