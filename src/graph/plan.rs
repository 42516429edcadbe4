//! Declarative job plans
//!
//! A YAML description of a computation graph: nodes with their operation,
//! dependency ids and storage binding, plus the id of the final node.
//! Building one yields the same `Arc<ComputationNode>` graph a host
//! adapter would hand over.

use super::node::{ComputationNode, StorageBinding};
use crate::binding::Configuration;
use crate::error::{LineageError, LineageResult};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

fn default_operation() -> String {
    "transform".to_string()
}

/// Storage binding as written in a plan
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum PlanBinding {
    Legacy { properties: Configuration },
    Modern { properties: Configuration },
}

impl PlanBinding {
    fn to_binding(&self) -> StorageBinding {
        match self {
            Self::Legacy { properties } => StorageBinding::legacy(properties.clone()),
            Self::Modern { properties } => StorageBinding::modern(properties.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanNode {
    pub id: String,
    #[serde(default = "default_operation")]
    pub operation: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub binding: Option<PlanBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobPlan {
    /// Application display name, if the plan carries one
    #[serde(default)]
    pub app_name: Option<String>,
    /// Id of the job's final node
    pub root: String,
    pub nodes: Vec<PlanNode>,
}

impl JobPlan {
    pub fn from_yaml(yaml: &str) -> LineageResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| LineageError::Plan(e.to_string()))
    }

    pub fn from_file(path: &Path) -> LineageResult<Self> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| LineageError::Plan(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&yaml)
    }

    /// Build the graph rooted at `root`.
    ///
    /// Nodes unreachable from the root are not built. Unknown dependency
    /// ids, duplicate ids and cycles are rejected.
    pub fn build(&self) -> LineageResult<Arc<ComputationNode>> {
        let mut specs: HashMap<&str, &PlanNode> = HashMap::new();
        for node in &self.nodes {
            if specs.insert(node.id.as_str(), node).is_some() {
                return Err(LineageError::Plan(format!("duplicate node id '{}'", node.id)));
            }
        }
        for node in &self.nodes {
            if let Some(missing) = node.dependencies.iter().find(|d| !specs.contains_key(d.as_str())) {
                return Err(LineageError::Plan(format!(
                    "node '{}' depends on unknown node '{}'",
                    node.id, missing
                )));
            }
        }
        if !specs.contains_key(self.root.as_str()) {
            return Err(LineageError::Plan(format!("root '{}' is not a node", self.root)));
        }

        // Iterative post-order: a node is built once all its dependencies are.
        let mut built: HashMap<&str, Arc<ComputationNode>> = HashMap::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&str, bool)> = vec![(self.root.as_str(), false)];

        while let Some((id, expanded)) = stack.pop() {
            if built.contains_key(id) {
                continue;
            }
            let spec = specs[id];

            if expanded {
                on_path.remove(id);
                let mut node = ComputationNode::new(spec.operation.as_str()).with_id(id);
                if let Some(binding) = &spec.binding {
                    node = node.with_binding(binding.to_binding());
                }
                for dep in &spec.dependencies {
                    node = node.depends_on(built[dep.as_str()].clone());
                }
                built.insert(id, node.into_arc());
            } else {
                if !on_path.insert(id) {
                    return Err(LineageError::Plan(format!("dependency cycle through '{}'", id)));
                }
                stack.push((id, true));
                for dep in spec.dependencies.iter().rev() {
                    stack.push((dep.as_str(), false));
                }
            }
        }

        built
            .remove(self.root.as_str())
            .ok_or_else(|| LineageError::Plan(format!("root '{}' was not built", self.root)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::flatten;

    const PLAN: &str = r#"
app_name: My ETL Job
root: write
nodes:
  - id: read
    operation: HadoopRDD
    binding:
      kind: legacy
      properties:
        mapred.input.dir: file:///data/in
  - id: clean
    dependencies: [read]
  - id: enrich
    dependencies: [read]
  - id: write
    operation: saveAsNewAPIHadoopFile
    dependencies: [clean, enrich]
    binding:
      kind: modern
      properties:
        mapreduce.output.fileoutputformat.outputdir: file:///data/out
"#;

    #[test]
    fn parses_and_builds_diamond() {
        let plan = JobPlan::from_yaml(PLAN).unwrap();
        assert_eq!(plan.app_name.as_deref(), Some("My ETL Job"));

        let root = plan.build().unwrap();
        assert_eq!(root.id.as_str(), "write");
        assert_eq!(root.binding.kind(), "modern");

        let flat = flatten(&root);
        assert_eq!(flat.len(), 4);
        let read = flat.iter().find(|n| n.id.as_str() == "read").unwrap();
        assert_eq!(read.binding.kind(), "legacy");
        assert_eq!(read.operation, "HadoopRDD");
    }

    #[test]
    fn shared_dependency_is_built_once() {
        let root = JobPlan::from_yaml(PLAN).unwrap().build().unwrap();
        let clean_read = &root.dependencies()[0].dependencies()[0];
        let enrich_read = &root.dependencies()[1].dependencies()[0];
        assert!(Arc::ptr_eq(clean_read, enrich_read));
    }

    #[test]
    fn operation_defaults_to_transform() {
        let root = JobPlan::from_yaml("root: a\nnodes:\n  - id: a\n").unwrap().build().unwrap();
        assert_eq!(root.operation, "transform");
        assert_eq!(root.binding.kind(), "none");
    }

    #[test]
    fn rejects_unknown_dependency() {
        let plan = JobPlan::from_yaml("root: a\nnodes:\n  - id: a\n    dependencies: [ghost]\n").unwrap();
        let err = plan.build().unwrap_err().to_string();
        assert!(err.contains("ghost"), "{}", err);
    }

    #[test]
    fn rejects_cycles() {
        let yaml = "root: a\nnodes:\n  - id: a\n    dependencies: [b]\n  - id: b\n    dependencies: [a]\n";
        let err = JobPlan::from_yaml(yaml).unwrap().build().unwrap_err().to_string();
        assert!(err.contains("cycle"), "{}", err);
    }

    #[test]
    fn rejects_duplicate_ids_and_missing_root() {
        let dup = JobPlan::from_yaml("root: a\nnodes:\n  - id: a\n  - id: a\n").unwrap();
        assert!(dup.build().is_err());

        let no_root = JobPlan::from_yaml("root: z\nnodes:\n  - id: a\n").unwrap();
        assert!(no_root.build().is_err());
    }

    #[test]
    fn rejects_unknown_binding_kind() {
        let yaml = "root: a\nnodes:\n  - id: a\n    binding:\n      kind: magic\n      properties: {}\n";
        assert!(matches!(JobPlan::from_yaml(yaml), Err(LineageError::Plan(_))));
    }
}
