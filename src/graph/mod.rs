//! Computation graph structures and traversal

mod flatten;
mod node;
mod plan;

pub use flatten::flatten;
pub use node::{ComputationNode, NodeId, StorageBinding};
pub use plan::{JobPlan, PlanBinding, PlanNode};
