//! Call-history unfolding over the call graph.
//!
//! Starting from a function, walk callsite edges towards callers and record
//! every chain that ends at a root (a name missing from the index), at a
//! caller with no callers of its own, at a cycle, or past a stop boundary.
//!
//! The walk is a depth-first search driven by an explicit frame stack:
//! - `visited` holds only the functions on the active branch, so the same
//!   function can appear again on a sibling branch
//! - `path` is pushed before descending an edge and popped when that edge's
//!   subtree is finished, whatever the outcome
//! - once `limit` distinct paths are collected the whole walk stops; siblings
//!   not yet explored are skipped
//!
//! Callsites are explored in stored order. The paths found under the cap are
//! therefore an arbitrary sample, not a ranking.

use super::index::CallGraphIndex;
use crate::parser::schema::Callsite;
use crate::utils::config::DEFAULT_PATH_LIMIT;
use crate::utils::paths::basename;
use indexmap::IndexSet;
use std::collections::HashSet;

/// Decides whether unfolding stops after descending a callsite
pub trait StopBoundary {
    fn stops_at(&self, callsite: &Callsite) -> bool;
}

impl<F> StopBoundary for F
where
    F: Fn(&Callsite) -> bool,
{
    fn stops_at(&self, callsite: &Callsite) -> bool {
        self(callsite)
    }
}

/// Never stops early; only roots and cycles end a path
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBoundary;

impl StopBoundary for NoBoundary {
    fn stops_at(&self, _callsite: &Callsite) -> bool {
        false
    }
}

/// Stops at callers that are significant functions or live in significant files
#[derive(Debug, Clone, Default)]
pub struct MajorBoundary {
    files: HashSet<String>,
    functions: HashSet<String>,
}

impl MajorBoundary {
    pub fn new<I, J, S, T>(files: I, functions: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            functions: functions.into_iter().map(Into::into).collect(),
        }
    }

    /// True if the file's basename is one of the significant files
    pub fn is_major_file(&self, file: &str) -> bool {
        self.files.contains(basename(file))
    }
}

impl StopBoundary for MajorBoundary {
    fn stops_at(&self, callsite: &Callsite) -> bool {
        self.functions.contains(&callsite.caller_display_name) || self.is_major_file(&callsite.file)
    }
}

/// How a callsite edge is rendered as one path line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    /// `<prr>  <file>:<ln>:<col>\tcaller: <name>` with optional linkage name
    Classified { show_linkage: bool },
    /// `-----> <file>:<ln>:<col>\tcaller: <name>\t<linkage>`
    Arrow,
}

impl EdgeStyle {
    pub fn describe(&self, callsite: &Callsite) -> String {
        match self {
            EdgeStyle::Classified { show_linkage } => {
                let mut line = format!(
                    "{}  {}:{}:{}\tcaller: {}",
                    callsite.category,
                    callsite.file,
                    callsite.line,
                    callsite.column,
                    callsite.caller_display_name
                );
                if *show_linkage {
                    line.push('\t');
                    line.push_str(&callsite.caller_linkage_name);
                }
                line
            }
            EdgeStyle::Arrow => format!(
                "-----> {}:{}:{}\tcaller: {}\t{}",
                callsite.file,
                callsite.line,
                callsite.column,
                callsite.caller_display_name,
                callsite.caller_linkage_name
            ),
        }
    }
}

/// Result of one unfolding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallPaths {
    /// Distinct multi-line paths, in discovery order
    pub paths: IndexSet<String>,

    /// The cap was reached before the search was exhausted
    pub truncated: bool,
}

impl CallPaths {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

/// One function being expanded on the active branch
struct Frame<'a> {
    function: &'a str,
    callsites: &'a [Callsite],
    next: usize,
    early_stop: bool,
}

enum Step<'a> {
    /// Branch ended; `true` means the search may continue
    Leaf(bool),
    Descend(Frame<'a>),
}

/// Bounded, cycle-safe call path enumerator
pub struct PathEnumerator<'a> {
    index: &'a CallGraphIndex,
    boundary: &'a dyn StopBoundary,
    style: EdgeStyle,
    limit: usize,
    indent: usize,
}

impl<'a> PathEnumerator<'a> {
    /// Create an enumerator with no stop boundary and the default cap
    pub fn new(index: &'a CallGraphIndex) -> Self {
        Self {
            index,
            boundary: &NoBoundary,
            style: EdgeStyle::Classified { show_linkage: false },
            limit: DEFAULT_PATH_LIMIT,
            indent: 0,
        }
    }

    pub fn with_boundary(mut self, boundary: &'a dyn StopBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_style(mut self, style: EdgeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Number of tab characters prefixed to every path line
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Unfold the call history of `start`
    ///
    /// **Public** - main entry point
    ///
    /// The stop boundary is evaluated on the callsites descended into, never
    /// on `start` itself, so the starting function is always expanded.
    pub fn enumerate(&self, start: &str) -> CallPaths {
        let mut result = IndexSet::new();
        if self.limit == 0 {
            return CallPaths {
                paths: result,
                truncated: true,
            };
        }

        let mut path: Vec<String> = Vec::new();
        let mut visited: HashSet<&'a str> = HashSet::new();
        let mut stack: Vec<Frame<'a>> = Vec::new();

        let mut proceed = match self.enter(start, false, &mut visited, &path, &mut result) {
            Step::Leaf(proceed) => proceed,
            Step::Descend(frame) => {
                stack.push(frame);
                true
            }
        };

        while let Some(frame) = stack.last_mut() {
            if !proceed || frame.next == frame.callsites.len() {
                let function = frame.function;
                visited.remove(function);
                stack.pop();
                // The edge that led into the finished frame
                if !stack.is_empty() {
                    path.pop();
                }
                continue;
            }

            let callsites = frame.callsites;
            let callsite = &callsites[frame.next];
            frame.next += 1;
            let early_stop = frame.early_stop || self.boundary.stops_at(callsite);

            path.push(self.style.describe(callsite));
            match self.enter(
                &callsite.caller_linkage_name,
                early_stop,
                &mut visited,
                &path,
                &mut result,
            ) {
                Step::Leaf(next) => {
                    path.pop();
                    proceed = next;
                }
                Step::Descend(child) => stack.push(child),
            }
        }

        CallPaths {
            paths: result,
            truncated: !proceed,
        }
    }

    fn enter(
        &self,
        function: &str,
        early_stop: bool,
        visited: &mut HashSet<&'a str>,
        path: &[String],
        result: &mut IndexSet<String>,
    ) -> Step<'a> {
        let index: &'a CallGraphIndex = self.index;
        match index.lookup(function) {
            // A present node with no callsites pops without recording anything
            Some(node) if !early_stop && !visited.contains(function) => {
                visited.insert(node.linkage_name.as_str());
                Step::Descend(Frame {
                    function: node.linkage_name.as_str(),
                    callsites: &node.callsites,
                    next: 0,
                    early_stop,
                })
            }
            _ => Step::Leaf(self.record(path, result)),
        }
    }

    fn record(&self, path: &[String], result: &mut IndexSet<String>) -> bool {
        let prefix = "\t".repeat(self.indent);
        let joined = path
            .iter()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n");
        result.insert(joined);
        result.len() < self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::{CallGraphNode, Prr};

    fn callsite(file: &str, caller: &str) -> Callsite {
        Callsite {
            file: file.to_string(),
            line: 10,
            column: 2,
            category: Prr::Defef,
            caller_display_name: caller.to_string(),
            caller_linkage_name: caller.to_string(),
        }
    }

    fn graph(edges: &[(&str, &[&str])]) -> CallGraphIndex {
        CallGraphIndex::from_nodes(edges.iter().map(|(callee, callers)| CallGraphNode {
            linkage_name: callee.to_string(),
            callsites: callers.iter().map(|c| callsite("lib.C", c)).collect(),
        }))
        .unwrap()
    }

    #[test]
    fn test_absent_start_yields_single_empty_path() {
        let index = graph(&[]);
        let paths = PathEnumerator::new(&index).enumerate("main");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths.iter().next(), Some(""));
        assert!(!paths.truncated);
    }

    #[test]
    fn test_present_node_without_callers_records_nothing() {
        // g and lonely are in the graph but nobody calls them
        let index = graph(&[("f", &["g"]), ("g", &[]), ("lonely", &[])]);
        let enumerator = PathEnumerator::new(&index);

        let from_lonely = enumerator.enumerate("lonely");
        assert!(from_lonely.is_empty());
        assert!(!from_lonely.truncated);

        let from_f = enumerator.enumerate("f");
        assert!(from_f.is_empty());
        assert!(!from_f.truncated);
    }

    #[test]
    fn test_backtracking_restores_path() {
        // f is called by g and h; both are roots
        let index = graph(&[("f", &["g", "h"])]);
        let paths = PathEnumerator::new(&index)
            .with_style(EdgeStyle::Arrow)
            .enumerate("f");

        let collected: Vec<&str> = paths.iter().collect();
        assert_eq!(
            collected,
            vec![
                "-----> lib.C:10:2\tcaller: g\tg",
                "-----> lib.C:10:2\tcaller: h\th",
            ]
        );
    }

    #[test]
    fn test_same_function_on_sibling_branches() {
        // f <- a <- r, f <- b <- r: r is revisited on the second branch
        let index = graph(&[("f", &["a", "b"]), ("a", &["r"]), ("b", &["r"]), ("r", &["main"])]);
        let paths = PathEnumerator::new(&index).enumerate("f");
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.lines().count() == 3));
    }

    #[test]
    fn test_cap_stops_siblings() {
        let index = graph(&[("f", &["a", "b", "c", "d"])]);
        let paths = PathEnumerator::new(&index).with_limit(2).enumerate("f");
        assert_eq!(paths.len(), 2);
        assert!(paths.truncated);
        assert!(paths.iter().all(|p| !p.contains("caller: c")));
    }

    #[test]
    fn test_boundary_does_not_leak_to_siblings() {
        // a is significant, so the first branch stops at a; b must still expand
        let index = graph(&[("f", &["a", "b"]), ("a", &["x"]), ("b", &["y"])]);
        let boundary = |c: &Callsite| c.caller_display_name == "a";
        let paths = PathEnumerator::new(&index)
            .with_boundary(&boundary)
            .enumerate("f");

        let collected: Vec<&str> = paths.iter().collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].lines().count(), 1);
        assert_eq!(collected[1].lines().count(), 2);
    }

    #[test]
    fn test_indent_prefixes_every_line() {
        let index = graph(&[("f", &["g"]), ("g", &["main"])]);
        let paths = PathEnumerator::new(&index).with_indent(2).enumerate("f");
        let path = paths.iter().next().unwrap();
        assert!(path.lines().all(|line| line.starts_with("\t\tdefef  ")));
    }

    #[test]
    fn test_zero_limit() {
        let index = graph(&[("f", &["g"])]);
        let paths = PathEnumerator::new(&index).with_limit(0).enumerate("f");
        assert!(paths.is_empty());
        assert!(paths.truncated);
    }

    #[test]
    fn test_major_boundary_matches_basename() {
        let boundary = MajorBoundary::new(["wc.C"], ["wordCounts"]);
        assert!(boundary.stops_at(&callsite("bench/wc.C", "helper")));
        assert!(boundary.stops_at(&callsite("lib.C", "wordCounts")));
        assert!(!boundary.stops_at(&callsite("lib.C", "helper")));
    }

    #[test]
    fn test_classified_style_with_linkage() {
        let mut site = callsite("lib.C", "g");
        site.caller_linkage_name = "_Z1gv".to_string();
        let style = EdgeStyle::Classified { show_linkage: true };
        assert_eq!(style.describe(&site), "defef  lib.C:10:2\tcaller: g\t_Z1gv");
    }
}
