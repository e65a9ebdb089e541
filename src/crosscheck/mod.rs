//! Cross-checking runtime instrumentation against static classification.
//!
//! This module:
//! - Matches instrumentation records to static analysis records by site ID
//! - Classifies each site's label/count consistency
//! - Produces the merged record set and a provenance report

pub mod merge;
pub mod report;
pub mod verdict;

// Re-export main types
pub use merge::{cross_check, prr_counts, CheckedSite, CrossCheck};
pub use report::render_provenance;
pub use verdict::{Evidence, Verdict};
