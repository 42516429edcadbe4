//! Dependency graph flattening
//!
//! Walks dependency edges from a root with an explicit stack, so graph
//! depth is bounded by heap rather than call-stack size.

use super::node::ComputationNode;
use std::collections::HashSet;
use std::sync::Arc;

/// Every node reachable from `root`, root included, each exactly once.
///
/// Deduplication is by allocation identity: a node shared by two paths
/// (a diamond) appears once, while two structurally equal nodes both appear.
/// Nodes are returned in depth-first pre-order, dependencies visited in
/// declaration order.
pub fn flatten(root: &Arc<ComputationNode>) -> Vec<Arc<ComputationNode>> {
    let mut visited: HashSet<*const ComputationNode> = HashSet::new();
    let mut result = Vec::new();
    let mut stack = vec![Arc::clone(root)];

    while let Some(node) = stack.pop() {
        if !visited.insert(Arc::as_ptr(&node)) {
            continue;
        }

        // Reverse so the first dependency is popped next
        for dep in node.dependencies().iter().rev() {
            if !visited.contains(&Arc::as_ptr(dep)) {
                stack.push(Arc::clone(dep));
            }
        }
        result.push(node);
    }

    result
}
