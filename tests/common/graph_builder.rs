//! Graph building utilities
//!
//! Mirrors what a host adapter produces: read nodes carry a legacy or
//! modern input binding, write nodes a modern output binding.

use lineage::binding::{LEGACY_INPUT_DIR, MODERN_INPUT_DIR, MODERN_OUTPUT_DIR};
use lineage::{ComputationNode, ConfigSource, Configuration, ResolutionError, StorageBinding};
use std::sync::Arc;

/// A configuration whose loading always fails with an IO error
#[derive(Debug)]
pub struct Unreadable;

impl ConfigSource for Unreadable {
    fn load(&self) -> Result<Configuration, ResolutionError> {
        Err(ResolutionError::Io("job.xml: connection reset".to_string()))
    }
}

pub fn legacy_reader(id: &str, dirs: &str) -> Arc<ComputationNode> {
    ComputationNode::new("HadoopRDD")
        .with_id(id)
        .with_binding(StorageBinding::legacy(
            Configuration::new().with(LEGACY_INPUT_DIR, dirs),
        ))
        .into_arc()
}

pub fn modern_reader(id: &str, dirs: &str) -> Arc<ComputationNode> {
    ComputationNode::new("NewHadoopRDD")
        .with_id(id)
        .with_binding(StorageBinding::modern(
            Configuration::new().with(MODERN_INPUT_DIR, dirs),
        ))
        .into_arc()
}

pub fn modern_writer(id: &str, dir: &str, parents: Vec<Arc<ComputationNode>>) -> Arc<ComputationNode> {
    parents
        .into_iter()
        .fold(
            ComputationNode::new("saveAsNewAPIHadoopFile")
                .with_id(id)
                .with_binding(StorageBinding::modern(
                    Configuration::new().with(MODERN_OUTPUT_DIR, dir),
                )),
            |node, parent| node.depends_on(parent),
        )
        .into_arc()
}

pub fn transform(id: &str, parents: Vec<Arc<ComputationNode>>) -> Arc<ComputationNode> {
    parents
        .into_iter()
        .fold(ComputationNode::new("map").with_id(id), |node, parent| {
            node.depends_on(parent)
        })
        .into_arc()
}
