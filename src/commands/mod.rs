//! CLI command implementations.
//!
//! Each mode is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analysis;
pub mod parlaytime;
pub mod profile;
pub mod run;

// Re-export main command functions
pub use analysis::{execute_analysis, AnalysisArgs};
pub use parlaytime::{execute_parlaytime, ParlaytimeArgs, ParlaytimeOutputs};
pub use profile::{execute_profile, scan_log, ProfileArgs};
pub use run::{execute_run, validate_args, RunArgs};
