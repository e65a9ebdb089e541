//! Output writers for merged artifacts, worklists and reports.
//!
//! This module handles writing data to disk in various formats:
//! - JSON artifacts (merged records)
//! - CSV timing comparisons
//! - Text worklists and profiling reports

pub mod csv;
pub mod json;
pub mod report;
pub mod worklist;

// Re-export main functions
pub use self::csv::write_csv;
pub use json::{read_json, write_json, write_text};
pub use report::{render_profile_report, CallHistory};
pub use worklist::render_worklist;
