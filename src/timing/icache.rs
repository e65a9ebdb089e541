//! Parser for `perf stat` instruction-cache reports.
//!
//! Sections start with `== ` and carry the worker count plus hit and miss
//! counters, e.g. `1,234,567      icache.misses:u`.

use crate::utils::error::TimingError;
use log::debug;
use regex::Regex;

/// i-cache counters for one worker count
#[derive(Debug, Clone, PartialEq)]
pub struct IcacheRow {
    pub workers: u32,
    pub misses: u64,
    pub hits: u64,
    pub miss_rate: f64,
}

impl IcacheRow {
    pub fn new(workers: u32, misses: u64, hits: u64) -> Self {
        let total = misses + hits;
        let miss_rate = if total == 0 {
            0.0
        } else {
            misses as f64 / total as f64
        };
        Self {
            workers,
            misses,
            hits,
            miss_rate,
        }
    }
}

/// Parse an i-cache report
///
/// **Public** - main entry point
///
/// # Errors
/// * `TimingError::MissingField` - a section names a worker count but lacks a counter
/// * `TimingError::InvalidValue` - a counter or worker count does not parse
pub fn parse_icache_report(text: &str) -> Result<Vec<IcacheRow>, TimingError> {
    let workers_re = Regex::new(r"CILK_WORKERS\s*=\s*(\d+)")?;
    let misses_re = Regex::new(r"([\d,]+)\s+icache\.misses:u")?;
    let hits_re = Regex::new(r"([\d,]+)\s+icache\.hit:u")?;

    let mut rows = Vec::new();
    for section in text.split("== ").map(str::trim).filter(|s| !s.is_empty()) {
        let Some(caps) = workers_re.captures(section) else {
            debug!("Skipping i-cache section without worker marker");
            continue;
        };
        let raw_workers = &caps[1];
        let workers = u32::try_from(parse_count(raw_workers)?)
            .map_err(|_| TimingError::InvalidValue(raw_workers.to_string()))?;
        let misses = capture_count(&misses_re, section, "icache.misses")?;
        let hits = capture_count(&hits_re, section, "icache.hit")?;

        rows.push(IcacheRow::new(workers, misses, hits));
    }

    Ok(rows)
}

fn capture_count(re: &Regex, section: &str, field: &'static str) -> Result<u64, TimingError> {
    let caps = re.captures(section).ok_or_else(|| TimingError::MissingField {
        field,
        section: section.lines().next().unwrap_or_default().to_string(),
    })?;
    parse_count(&caps[1])
}

/// Parse a counter that may use `,` as a thousands separator
fn parse_count(text: &str) -> Result<u64, TimingError> {
    text.replace(',', "")
        .parse()
        .map_err(|_| TimingError::InvalidValue(text.to_string()))
}
