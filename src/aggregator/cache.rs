//! Side-car cache for aggregated perf statistics.
//!
//! Scanning a large log is slow, so the summary is persisted next to it. The
//! cache records a fingerprint of the log it was built from; whether a cached
//! summary may be reused is decided by an explicit [`CachePolicy`].

use super::accumulator::PerfSummary;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::CacheError;
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

/// When a cached summary may be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CachePolicy {
    /// Reuse any readable cache, even if the log changed
    Trust,
    /// Reuse only if the log fingerprint matches
    #[default]
    Verify,
    /// Always rescan the log
    Refresh,
}

/// Identity of a perf log: byte length plus SHA-256 of its raw bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFingerprint {
    pub len: u64,
    pub sha256: String,
}

impl SourceFingerprint {
    /// Hash a file's raw (possibly compressed) contents
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut hasher = Sha256::new();
        let len = io::copy(&mut reader, &mut hasher)?;
        Ok(Self {
            len,
            sha256: format!("{:x}", hasher.finalize()),
        })
    }

    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self {
            len: bytes.len() as u64,
            sha256: format!("{:x}", Sha256::digest(bytes)),
        }
    }
}

/// On-disk cache contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSummary {
    pub version: String,
    pub generated_at: String,
    pub source: Option<SourceFingerprint>,
    pub summary: PerfSummary,
}

impl CachedSummary {
    pub fn new(summary: PerfSummary, source: Option<SourceFingerprint>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            source,
            summary,
        }
    }

    /// Decide whether this cache may stand in for the current log
    ///
    /// With no current fingerprint (the log is gone) a cache is the only data
    /// left, so it is reused under every policy except `Refresh`.
    pub fn is_reusable(&self, policy: CachePolicy, current: Option<&SourceFingerprint>) -> bool {
        if self.version != SCHEMA_VERSION {
            return false;
        }
        match (policy, current) {
            (CachePolicy::Refresh, _) => false,
            (CachePolicy::Trust, _) | (CachePolicy::Verify, None) => true,
            (CachePolicy::Verify, Some(current)) => self.source.as_ref() == Some(current),
        }
    }
}

/// Read a cache file
pub fn read_cache(path: &Path) -> Result<CachedSummary, CacheError> {
    let file = File::open(path)?;
    let cached = serde_json::from_reader(BufReader::new(file))?;
    debug!("Loaded cache {}", path.display());
    Ok(cached)
}

/// Write a cache file
pub fn write_cache(path: &Path, cached: &CachedSummary) -> Result<(), CacheError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, cached)?;
    info!(">> wrote cache {}", path.display());
    Ok(())
}

/// Return the cached summary if it exists and the policy allows reuse
///
/// **Public** - a missing, unreadable or stale cache is never fatal
pub fn lookup(
    path: &Path,
    policy: CachePolicy,
    current: Option<&SourceFingerprint>,
) -> Option<PerfSummary> {
    if policy == CachePolicy::Refresh || !path.exists() {
        return None;
    }

    match read_cache(path) {
        Ok(cached) if cached.is_reusable(policy, current) => {
            info!(
                "Reusing cached statistics from {} (generated {})",
                path.display(),
                cached.generated_at
            );
            Some(cached.summary)
        }
        Ok(_) => {
            info!("Cache {} is stale, rescanning log", path.display());
            None
        }
        Err(e) => {
            warn!("Ignoring unreadable cache {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(tag: &str) -> SourceFingerprint {
        SourceFingerprint::of_bytes(tag.as_bytes())
    }

    #[test]
    fn test_policies() {
        let cached = CachedSummary::new(PerfSummary::default(), Some(fingerprint("a")));
        let same = fingerprint("a");
        let other = fingerprint("b");

        assert!(cached.is_reusable(CachePolicy::Verify, Some(&same)));
        assert!(!cached.is_reusable(CachePolicy::Verify, Some(&other)));
        assert!(cached.is_reusable(CachePolicy::Verify, None));
        assert!(cached.is_reusable(CachePolicy::Trust, Some(&other)));
        assert!(!cached.is_reusable(CachePolicy::Refresh, Some(&same)));
    }

    #[test]
    fn test_cache_without_fingerprint_fails_verification() {
        let cached = CachedSummary::new(PerfSummary::default(), None);
        assert!(!cached.is_reusable(CachePolicy::Verify, Some(&fingerprint("a"))));
    }

    #[test]
    fn test_fingerprint_of_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log");
        std::fs::write(&path, b"builtin,0,1,1,0,h,a,a\n").unwrap();

        assert_eq!(
            SourceFingerprint::of_file(&path).unwrap(),
            SourceFingerprint::of_bytes(b"builtin,0,1,1,0,h,a,a\n")
        );
    }

    #[test]
    fn test_lookup_ignores_corrupt_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{").unwrap();

        assert!(lookup(&path, CachePolicy::Trust, None).is_none());
        assert!(lookup(&dir.path().join("missing.json"), CachePolicy::Trust, None).is_none());
    }
}
