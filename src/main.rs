//! pfor-triage CLI
//!
//! Triage tool for parallel-loop conversion in benchmark suites.
//! Cross-checks static analysis against instrumentation, compares timing
//! experiments and summarizes runtime profiling logs.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use pfor_triage::aggregator::CachePolicy;
use pfor_triage::commands::{execute_run, RunArgs};
use pfor_triage::utils::config::{Config, DEFAULT_PATH_LIMIT};

/// pfor-triage - parallel-loop conversion triage
#[derive(Parser, Debug)]
#[command(name = "pfor-triage")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Benchmark suite to process
    #[arg(short = 'T', long)]
    test: String,

    /// Cross-check static analysis against instrumentation and write the worklist
    #[arg(short = 'A', long)]
    analysis: bool,

    /// Compare control and experiment timing logs
    #[arg(long)]
    parlaytime: bool,

    /// Experiment identifier (required with --parlaytime)
    #[arg(long)]
    id: Option<String>,

    /// Cluster machine number (required with --parlaytime)
    #[arg(long)]
    ece: Option<u32>,

    /// Summarize the runtime profiling log
    #[arg(long)]
    profile: bool,

    /// Suite configuration file (TOML); built-in suites are used if omitted
    #[arg(short, long, env = "PFOR_TRIAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured base directory
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Maximum call paths unfolded per function
    #[arg(long, default_value_t = DEFAULT_PATH_LIMIT)]
    path_limit: usize,

    /// When to reuse cached profiling statistics
    #[arg(long, value_enum, default_value_t = CachePolicy::Verify)]
    cache: CachePolicy,

    /// Enable verbose logging and reports
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(base_dir) = cli.base_dir {
        config.base_dir = base_dir;
    }

    let args = RunArgs {
        test: cli.test,
        analysis: cli.analysis,
        parlaytime: cli.parlaytime,
        profile: cli.profile,
        experiment_id: cli.id,
        ece: cli.ece,
        verbose: cli.verbose,
        path_limit: cli.path_limit,
        cache_policy: cli.cache,
    };

    execute_run(&args, &config)
}
