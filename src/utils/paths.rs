//! Source path normalization.
//!
//! Artifacts record source files the way the compiler saw them, which may
//! contain `.`/`..` segments or point into a build-time directory layout.
//! Paths are normalized lexically, then rewritten by the first matching prefix.

use serde::Deserialize;

/// A single prefix rewrite rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathRewrite {
    pub from: String,
    pub to: String,
}

impl PathRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Normalizes source file paths found in artifacts
#[derive(Debug, Clone, Default)]
pub struct PathNormalizer {
    rewrites: Vec<PathRewrite>,
}

impl PathNormalizer {
    pub fn new(rewrites: Vec<PathRewrite>) -> Self {
        Self { rewrites }
    }

    /// Normalize a path and apply the first matching rewrite
    ///
    /// **Public** - used when indexing call graphs and printing callsites
    pub fn normalize(&self, path: &str) -> String {
        let normal = lexical_normalize(path);

        for rewrite in &self.rewrites {
            if let Some(rest) = normal.strip_prefix(rewrite.from.as_str()) {
                return format!("{}{}", rewrite.to, rest);
            }
        }

        normal
    }
}

/// Collapse `.`, `..` and repeated separators without touching the filesystem
fn lexical_normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Final path component, used to match significant files
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_normalize() {
        assert_eq!(lexical_normalize("a/./b//c"), "a/b/c");
        assert_eq!(lexical_normalize("a/b/../c"), "a/c");
        assert_eq!(lexical_normalize("../x/../../y"), "../../y");
        assert_eq!(lexical_normalize("/../usr/include"), "/usr/include");
        assert_eq!(lexical_normalize("a/.."), ".");
        assert_eq!(lexical_normalize(""), ".");
        assert_eq!(lexical_normalize("/"), "/");
    }

    #[test]
    fn test_first_rewrite_wins() {
        let normalizer = PathNormalizer::new(vec![
            PathRewrite::new("bench/parlay", "impl/parlay"),
            PathRewrite::new("bench", "other"),
        ]);
        assert_eq!(
            normalizer.normalize("bench/../bench/parlay/seq.h"),
            "impl/parlay/seq.h"
        );
        assert_eq!(normalizer.normalize("bench/common/io.h"), "other/common/io.h");
        assert_eq!(normalizer.normalize("src/main.C"), "src/main.C");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("delaunay/bench/delaunay.C"), "delaunay.C");
        assert_eq!(basename("wc.C"), "wc.C");
    }
}
