//! Configuration and constants for the CLI.
//!
//! Benchmark suites (where their artifacts live and which files/functions
//! bound call-history unfolding) come from an optional TOML file. Without one,
//! the built-in suites below are used.

use super::error::ConfigError;
use super::paths::{PathNormalizer, PathRewrite};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Current side-car cache schema version
pub const SCHEMA_VERSION: &str = "1.1.0";

/// Default number of call paths unfolded per function
pub const DEFAULT_PATH_LIMIT: usize = 10;

/// Progress is logged every time this share of the log has been consumed
pub const PROGRESS_STEP_PERCENT: u64 = 10;

// Artifact file name suffixes, appended to the suite name
pub const CALL_GRAPH_SUFFIX: &str = ".cg.json";
pub const PERF_CALL_GRAPH_SUFFIX: &str = "-perf.cg.json";
pub const STATIC_ANALYSIS_SUFFIX: &str = ".cilkfor.json";
pub const INSTRUMENTATION_SUFFIX: &str = ".instr.json";
pub const MERGED_SUFFIX: &str = ".instr.cilkfor.json";
pub const WORKLIST_SUFFIX: &str = ".worklist.txt";
pub const PERF_LOG_SUFFIX: &str = ".perf.log.gz";
pub const PERF_CACHE_SUFFIX: &str = ".perf.short.json";
pub const PERF_REPORT_SUFFIX: &str = ".perf.report.txt";

/// Timing logs live in `<base>/data/<suite>/`
pub const TIMING_DATA_DIR: &str = "data";

/// Timing comparisons are written to `<base>/perf/<suite>/`
pub const TIMING_RESULT_DIR: &str = "perf";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory every relative path below is resolved against
    pub base_dir: PathBuf,

    /// Known benchmark suites
    #[serde(rename = "suite")]
    pub suites: Vec<SuiteConfig>,

    /// Prefix rewrites applied to source file paths found in artifacts
    #[serde(rename = "path_rewrite")]
    pub path_rewrites: Vec<PathRewrite>,
}

/// One benchmark suite
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteConfig {
    /// Suite name as passed to `--test`
    pub name: String,

    /// Work directory holding the analysis/instrumentation artifacts
    pub analysis_dir: PathBuf,

    /// Work directory holding the profiling artifacts
    pub profile_dir: PathBuf,

    /// Source file basenames that end call-history unfolding
    #[serde(default)]
    pub major_files: Vec<String>,

    /// Function display names that end call-history unfolding
    #[serde(default)]
    pub major_functions: Vec<String>,
}

impl SuiteConfig {
    fn builtin(name: &str, analysis: &str, profile: &str, files: &[&str], funcs: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            analysis_dir: PathBuf::from(analysis),
            profile_dir: PathBuf::from(profile),
            major_files: files.iter().map(|s| s.to_string()).collect(),
            major_functions: funcs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            suites: vec![
                SuiteConfig::builtin(
                    "delaunayTriangulation",
                    "delaunayTriangulation-cp/incrementalDelaunay",
                    "delaunayTriangulation-test/incrementalDelaunay",
                    &["delaunay.C", "delaunayTime.C"],
                    &["delaunay"],
                ),
                SuiteConfig::builtin(
                    "wordCounts",
                    "wordCounts-cp/histogram",
                    "wordCounts-test/histogram",
                    &["wc.C", "wcTime.C"],
                    &["wordCounts", "timeWordCounts"],
                ),
                SuiteConfig::builtin(
                    "classify",
                    "classify-cp/decisionTree",
                    "classify-test/decisionTree",
                    &["classify.C", "classifyTime.C"],
                    &["classify"],
                ),
            ],
            path_rewrites: vec![
                PathRewrite::new(
                    "delaunayTriangulation/bench/parlay",
                    "delaunayTriangulation/incrementalDelaunay/parlay",
                ),
                PathRewrite::new(
                    "delaunayTriangulation/bench/common",
                    "delaunayTriangulation/incrementalDelaunay/common",
                ),
            ],
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, or fall back to the built-in suites
    ///
    /// **Public** - called once from main.rs
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("No config file given, using built-in suites");
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        debug!("Loaded {} suites from config", config.suites.len());
        Ok(config)
    }

    /// Look up a suite by name
    pub fn suite(&self, name: &str) -> Result<&SuiteConfig, ConfigError> {
        self.suites
            .iter()
            .find(|suite| suite.name == name)
            .ok_or_else(|| ConfigError::UnknownSuite(name.to_string()))
    }

    /// Resolve a possibly-relative directory against `base_dir`
    pub fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.base_dir.join(dir)
        }
    }

    /// Build the source path normalizer from the configured rewrites
    pub fn normalizer(&self) -> PathNormalizer {
        PathNormalizer::new(self.path_rewrites.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_suites() {
        let config = Config::default();
        let suite = config.suite("wordCounts").unwrap();
        assert_eq!(suite.major_functions, vec!["wordCounts", "timeWordCounts"]);
        assert!(config.suite("nbody").is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            base_dir = "/data/pbbs"

            [[suite]]
            name = "histogram"
            analysis_dir = "histogram-cp"
            profile_dir = "/abs/histogram-test"
            major_files = ["hist.C"]

            [[path_rewrite]]
            from = "a/b"
            to = "a/c"
            "#,
        )
        .unwrap();

        let suite = config.suite("histogram").unwrap();
        assert!(suite.major_functions.is_empty());
        assert_eq!(
            config.resolve(&suite.analysis_dir),
            PathBuf::from("/data/pbbs/histogram-cp")
        );
        assert_eq!(
            config.resolve(&suite.profile_dir),
            PathBuf::from("/abs/histogram-test")
        );
        assert_eq!(config.normalizer().normalize("a/b/x.h"), "a/c/x.h");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_toml("base_dir = \"/tmp\"").unwrap();
        assert_eq!(config.suites.len(), 3);
    }
}
