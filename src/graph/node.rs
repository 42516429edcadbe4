//! Computation node representation in the dependency graph

use crate::binding::ConfigSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Identifier for a computation node
///
/// Used for logging and plan wiring only. Graph identity (for
/// deduplication) is the node allocation itself, since two distinct
/// nodes may legitimately carry the same label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new random NodeId
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a NodeId from an existing string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a node is attached to external storage.
///
/// The host adapter decides the tag once, when it builds the graph. The
/// resolver only ever matches on it.
#[derive(Debug, Clone, Default)]
pub enum StorageBinding {
    /// Pure transformation, or an I/O node we cannot see into
    #[default]
    None,
    /// Old-style (mapred) job configuration
    Legacy(Arc<dyn ConfigSource>),
    /// New-style (mapreduce) job configuration
    Modern(Arc<dyn ConfigSource>),
}

impl StorageBinding {
    pub fn legacy(source: impl ConfigSource + 'static) -> Self {
        Self::Legacy(Arc::new(source))
    }

    pub fn modern(source: impl ConfigSource + 'static) -> Self {
        Self::Modern(Arc::new(source))
    }

    /// The attached configuration, whichever shape carries it
    pub fn source(&self) -> Option<&Arc<dyn ConfigSource>> {
        match self {
            Self::None => None,
            Self::Legacy(source) | Self::Modern(source) => Some(source),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Legacy(_) => "legacy",
            Self::Modern(_) => "modern",
        }
    }
}

/// A node in a job's computation graph.
///
/// Nodes are immutable once built and shared through `Arc`; a node's
/// dependencies point at its predecessors, so the graph is rooted at the
/// job's final node.
#[derive(Debug, Clone)]
pub struct ComputationNode {
    /// Label used in logs
    pub id: NodeId,
    /// Operation name reported by the host (e.g. "HadoopRDD", "map")
    pub operation: String,
    /// Storage binding resolved by the host adapter
    pub binding: StorageBinding,
    dependencies: Vec<Arc<ComputationNode>>,
}

impl ComputationNode {
    /// Create an unbound node with no dependencies
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            operation: operation.into(),
            binding: StorageBinding::None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = NodeId::from_string(id);
        self
    }

    pub fn with_binding(mut self, binding: StorageBinding) -> Self {
        self.binding = binding;
        self
    }

    /// Add a dependency edge to a predecessor
    pub fn depends_on(mut self, parent: Arc<ComputationNode>) -> Self {
        self.dependencies.push(parent);
        self
    }

    pub fn dependencies(&self) -> &[Arc<ComputationNode>] {
        &self.dependencies
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

// Unlinks uniquely-owned predecessors iteratively; the derived drop would
// recurse once per level of a deep lineage chain.
impl Drop for ComputationNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.dependencies);
        while let Some(dep) = pending.pop() {
            if let Ok(mut node) = Arc::try_unwrap(dep) {
                pending.append(&mut node.dependencies);
            }
        }
    }
}
