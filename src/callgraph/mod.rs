//! Call graph indexing and call-history unfolding.
//!
//! The call graph maps each function to the callsites that call it, so
//! walking it moves from a callee towards its callers.

pub mod index;
pub mod paths;

// Re-export main types
pub use index::CallGraphIndex;
pub use paths::{CallPaths, EdgeStyle, MajorBoundary, NoBoundary, PathEnumerator, StopBoundary};
