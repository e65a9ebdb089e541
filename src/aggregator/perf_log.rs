//! Streaming reduction of the instrumentation perf log.
//!
//! The log is line-oriented, comma-separated, and tagged by its first field:
//!
//! ```text
//! calledat,<host>,<callsite>,<caller>,<depth>
//! builtin,<version>,<tripcount>,<granularity>,<depth>,<host>,<orig loc>,<inline loc>
//! ```
//!
//! Lines are folded into per-host state as they are read and never retained,
//! so memory is bounded by the number of distinct keys rather than log length.

use super::accumulator::{HostState, IntrinsicVersion, PerfSummary};
use crate::utils::error::PerfLogError;
use log::debug;
use std::collections::HashMap;
use std::io::BufRead;

const CALLED_AT_TAG: &str = "calledat";
const BUILTIN_TAG: &str = "builtin";
const CALLED_AT_FIELDS: usize = 5;
const BUILTIN_FIELDS: usize = 8;

/// One parsed log line, borrowing from the line text
#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord<'a> {
    /// `host`'s parallel loop was invoked by `caller` at `callsite`
    CalledAt {
        host: &'a str,
        callsite: &'a str,
        caller: &'a str,
        depth: u32,
    },
    /// One activation of a parallel-loop intrinsic
    Builtin {
        version: IntrinsicVersion,
        tripcount: u64,
        granularity: u64,
        depth: u32,
        host: &'a str,
        orig_location: &'a str,
        inline_location: &'a str,
    },
}

/// Parse a single non-empty log line
///
/// **Public** - exposed for tests and ad-hoc tooling
///
/// # Errors
/// * `PerfLogError::UnknownTag` - first field is neither `calledat` nor `builtin`
/// * `PerfLogError::FieldCount` - wrong number of fields for the tag
/// * `PerfLogError::InvalidNumber` - a numeric field does not parse
/// * `PerfLogError::UnknownVersion` - intrinsic version outside 0..=2
pub fn parse_line(line: &str, line_no: u64) -> Result<LogRecord<'_>, PerfLogError> {
    let fields: Vec<&str> = line.split(',').collect();

    match fields[0] {
        CALLED_AT_TAG => {
            expect_fields(&fields, CALLED_AT_TAG, CALLED_AT_FIELDS, line_no)?;
            Ok(LogRecord::CalledAt {
                host: fields[1],
                callsite: fields[2],
                caller: fields[3],
                depth: parse_number(fields[4], "depth", line_no)?,
            })
        }
        BUILTIN_TAG => {
            expect_fields(&fields, BUILTIN_TAG, BUILTIN_FIELDS, line_no)?;
            let code: u8 = parse_number(fields[1], "version", line_no)?;
            let version = IntrinsicVersion::from_code(code).ok_or(PerfLogError::UnknownVersion {
                line: line_no,
                version: code,
            })?;
            Ok(LogRecord::Builtin {
                version,
                tripcount: parse_number(fields[2], "tripcount", line_no)?,
                granularity: parse_number(fields[3], "granularity", line_no)?,
                depth: parse_number(fields[4], "depth", line_no)?,
                host: fields[5],
                orig_location: fields[6],
                inline_location: fields[7],
            })
        }
        tag => Err(PerfLogError::UnknownTag {
            line: line_no,
            tag: tag.to_string(),
        }),
    }
}

fn expect_fields(
    fields: &[&str],
    tag: &'static str,
    expected: usize,
    line_no: u64,
) -> Result<(), PerfLogError> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(PerfLogError::FieldCount {
            line: line_no,
            tag,
            expected,
            found: fields.len(),
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    line_no: u64,
) -> Result<T, PerfLogError> {
    value.trim().parse().map_err(|_| PerfLogError::InvalidNumber {
        line: line_no,
        field,
        value: value.to_string(),
    })
}

/// One-pass aggregator over perf log lines
#[derive(Debug, Default)]
pub struct PerfLogAggregator {
    hosts: HashMap<String, HostState>,
    lines: u64,
    /// First blank line not yet followed by content
    pending_blank: Option<u64>,
}

impl PerfLogAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one raw line into the statistics
    ///
    /// Blank lines are tolerated only at the end of the log; content after a
    /// blank line makes that blank line an unknown record.
    pub fn process_line(&mut self, line: &str) -> Result<(), PerfLogError> {
        self.lines += 1;
        let line = line.trim();

        if line.is_empty() {
            self.pending_blank.get_or_insert(self.lines);
            return Ok(());
        }
        if let Some(blank) = self.pending_blank {
            return Err(PerfLogError::UnknownTag {
                line: blank,
                tag: String::new(),
            });
        }

        let record = parse_line(line, self.lines)?;
        self.apply(&record);
        Ok(())
    }

    /// Fold an already-parsed record into the statistics
    pub fn apply(&mut self, record: &LogRecord<'_>) {
        match *record {
            LogRecord::CalledAt {
                host,
                callsite,
                caller,
                depth,
            } => {
                self.host_mut(host).callers.record(caller, callsite, depth);
            }
            LogRecord::Builtin {
                version,
                tripcount,
                granularity,
                depth,
                host,
                orig_location,
                inline_location,
            } => {
                let state = self.host_mut(host);
                state
                    .accumulator_mut(version, inline_location)
                    .record(tripcount, granularity, depth);
                if !state.origin_locations.contains(orig_location) {
                    state.origin_locations.insert(orig_location.to_string());
                }
            }
        }
    }

    /// Stream every line of `reader`, calling `on_line` after each one
    ///
    /// **Public** - main entry point for file-backed logs
    pub fn consume<R: BufRead>(
        &mut self,
        mut reader: R,
        mut on_line: impl FnMut(),
    ) -> Result<(), PerfLogError> {
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            self.process_line(&line)?;
            on_line();
        }

        debug!(
            "Consumed {} perf log lines for {} hosts",
            self.lines,
            self.hosts.len()
        );
        Ok(())
    }

    pub fn lines_processed(&self) -> u64 {
        self.lines
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Finish scanning and produce the serializable summary
    pub fn finish(self) -> PerfSummary {
        PerfSummary {
            hosts: self
                .hosts
                .into_iter()
                .map(|(host, state)| (host, state.into_profile()))
                .collect(),
        }
    }

    fn host_mut(&mut self, host: &str) -> &mut HostState {
        self.hosts.entry(host.to_string()).or_default()
    }
}

/// Aggregate an in-memory sequence of lines
pub fn aggregate_lines<'a, I>(lines: I) -> Result<PerfSummary, PerfLogError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut aggregator = PerfLogAggregator::new();
    for line in lines {
        aggregator.process_line(line)?;
    }
    Ok(aggregator.finish())
}
