//! Mode selection and dispatch.
//!
//! One invocation targets a single benchmark suite and runs any combination
//! of the three modes, always in the order analysis, timing, profile.

use super::analysis::{execute_analysis, AnalysisArgs};
use super::parlaytime::{execute_parlaytime, ParlaytimeArgs};
use super::profile::{execute_profile, ProfileArgs};
use crate::aggregator::CachePolicy;
use crate::utils::config::{Config, DEFAULT_PATH_LIMIT};
use anyhow::{Context, Result};
use log::info;

/// Arguments shared by every mode
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Benchmark suite name, also the artifact file prefix
    pub test: String,

    /// Cross-check instrumentation against static analysis
    pub analysis: bool,

    /// Compare control and experiment timings
    pub parlaytime: bool,

    /// Render the profiling report
    pub profile: bool,

    pub experiment_id: Option<String>,

    pub ece: Option<u32>,

    pub verbose: bool,

    pub path_limit: usize,

    pub cache_policy: CachePolicy,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            test: String::new(),
            analysis: false,
            parlaytime: false,
            profile: false,
            experiment_id: None,
            ece: None,
            verbose: false,
            path_limit: DEFAULT_PATH_LIMIT,
            cache_policy: CachePolicy::default(),
        }
    }
}

/// Validate run arguments
///
/// **Public** - called before any artifact is touched
///
/// # Arguments
/// * `args` - Arguments to validate
/// * `config` - Loaded configuration, used to check the suite name
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &RunArgs, config: &Config) -> Result<()> {
    if args.test.is_empty() {
        anyhow::bail!("Test suite name cannot be empty");
    }
    config.suite(&args.test)?;

    if !args.analysis && !args.parlaytime && !args.profile {
        anyhow::bail!("No mode selected: pass --analysis, --parlaytime or --profile");
    }

    if args.parlaytime {
        if args.experiment_id.as_deref().map_or(true, str::is_empty) {
            anyhow::bail!(
                "Must supply experiment id (printed at the end of performance experiment)"
            );
        }
        if args.ece.is_none() {
            anyhow::bail!("Must supply ece cluster machine id");
        }
    }

    if args.path_limit == 0 {
        anyhow::bail!("path_limit must be greater than 0");
    }

    Ok(())
}

/// Run every selected mode
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Invalid arguments (see [`validate_args`])
/// * The first failing mode's error; later modes do not run
pub fn execute_run(args: &RunArgs, config: &Config) -> Result<()> {
    validate_args(args, config)?;
    let suite = config.suite(&args.test)?;
    let normalizer = config.normalizer();

    if args.analysis {
        info!("== analysis ==");
        execute_analysis(&AnalysisArgs {
            workdir: config.resolve(&suite.analysis_dir),
            test: args.test.clone(),
            verbose: args.verbose,
            path_limit: args.path_limit,
            normalizer: normalizer.clone(),
        })
        .context("Analysis failed")?;
    }

    if let (true, Some(experiment_id), Some(ece)) =
        (args.parlaytime, args.experiment_id.as_ref(), args.ece)
    {
        info!("== parlaytime ==");
        execute_parlaytime(&ParlaytimeArgs {
            base_dir: config.base_dir.clone(),
            test: args.test.clone(),
            experiment_id: experiment_id.clone(),
            ece,
        })
        .context("Timing comparison failed")?;
    }

    if args.profile {
        info!("== profile ==");
        execute_profile(&ProfileArgs {
            workdir: config.resolve(&suite.profile_dir),
            test: args.test.clone(),
            verbose: args.verbose,
            path_limit: args.path_limit,
            cache_policy: args.cache_policy,
            major_files: suite.major_files.clone(),
            major_functions: suite.major_functions.clone(),
            normalizer,
        })
        .context("Profiling report failed")?;
    }

    Ok(())
}
