//! Lookup table from function linkage name to its call graph node.
//!
//! A name missing from the index is not an error: it marks a call graph root
//! (e.g. `main`) or a function defined outside the analyzed module.

use crate::parser::schema::CallGraphNode;
use crate::utils::error::CallGraphError;
use crate::utils::paths::PathNormalizer;
use log::debug;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Read-only index over a loaded call graph
#[derive(Debug, Clone, Default)]
pub struct CallGraphIndex {
    nodes: HashMap<String, CallGraphNode>,
}

impl CallGraphIndex {
    /// Build the index from raw node records
    ///
    /// **Public** - main constructor
    ///
    /// # Errors
    /// * `CallGraphError::DuplicateFunction` - two records share a linkage name
    pub fn from_nodes(
        nodes: impl IntoIterator<Item = CallGraphNode>,
    ) -> Result<Self, CallGraphError> {
        let mut index = HashMap::new();

        for node in nodes {
            match index.entry(node.linkage_name.clone()) {
                Entry::Occupied(entry) => {
                    return Err(CallGraphError::DuplicateFunction(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(node);
                }
            }
        }

        debug!("Indexed {} call graph nodes", index.len());
        Ok(Self { nodes: index })
    }

    /// Build the index, normalizing every callsite's source file first
    pub fn from_nodes_normalized(
        nodes: impl IntoIterator<Item = CallGraphNode>,
        normalizer: &PathNormalizer,
    ) -> Result<Self, CallGraphError> {
        Self::from_nodes(nodes.into_iter().map(|mut node| {
            for callsite in &mut node.callsites {
                callsite.file = normalizer.normalize(&callsite.file);
            }
            node
        }))
    }

    pub fn lookup(&self, linkage_name: &str) -> Option<&CallGraphNode> {
        self.nodes.get(linkage_name)
    }

    pub fn contains(&self, linkage_name: &str) -> bool {
        self.nodes.contains_key(linkage_name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
