//! Storage binding resolution
//!
//! Extracts raw locations from the configuration attached to a node:
//! - Inputs: legacy bindings read the mapred input list, modern bindings
//!   the mapreduce one
//! - Outputs: the legacy key is tried first, then the modern key, whatever
//!   the binding shape
//! - Unbound nodes resolve to nothing
//!
//! Any `ResolutionError` gets the same treatment: a warning naming the
//! node, and the failing part contributes no locations. A configuration
//! that cannot be loaded drops both directions of its node.

use super::config::{
    split_dir_list, Configuration, LEGACY_INPUT_DIR, LEGACY_OUTPUT_DIR, MODERN_INPUT_DIR,
    MODERN_OUTPUT_DIR,
};
use super::location::Location;
use crate::error::ResolutionError;
use crate::graph::{ComputationNode, StorageBinding};
use std::sync::Arc;
use tracing::warn;

/// Reads one output location or N input locations out of a configuration.
trait LocationAccessor {
    fn output_dir<'a>(&self, conf: &'a Configuration) -> Option<&'a str>;
    fn input_dirs(&self, conf: &Configuration) -> Vec<String>;
}

/// Old-style (mapred) accessor
struct LegacyAccessor;

impl LocationAccessor for LegacyAccessor {
    fn output_dir<'a>(&self, conf: &'a Configuration) -> Option<&'a str> {
        conf.get(LEGACY_OUTPUT_DIR)
    }

    fn input_dirs(&self, conf: &Configuration) -> Vec<String> {
        conf.get(LEGACY_INPUT_DIR).map(split_dir_list).unwrap_or_default()
    }
}

/// New-style (mapreduce) accessor
struct ModernAccessor;

impl LocationAccessor for ModernAccessor {
    fn output_dir<'a>(&self, conf: &'a Configuration) -> Option<&'a str> {
        conf.get(MODERN_OUTPUT_DIR)
    }

    fn input_dirs(&self, conf: &Configuration) -> Vec<String> {
        conf.get(MODERN_INPUT_DIR).map(split_dir_list).unwrap_or_default()
    }
}

/// Locations one node reads and writes, taken from a single configuration load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeLocations {
    pub inputs: Vec<Location>,
    pub output: Option<Location>,
}

/// Resolves storage bindings to qualified locations.
#[derive(Debug, Clone)]
pub struct BindingResolver {
    default_fs: Location,
}

impl BindingResolver {
    /// Bare paths found in configurations are qualified against `default_fs`.
    pub fn new(default_fs: Location) -> Self {
        Self { default_fs }
    }

    pub fn default_fs(&self) -> &Location {
        &self.default_fs
    }

    /// The node's output location, if it writes to external storage.
    pub fn resolve_output_location(&self, node: &ComputationNode) -> Option<Location> {
        let conf = self.load(node)?;
        self.output_from(node, &conf)
    }

    /// The node's input locations, if it reads from external storage.
    pub fn resolve_input_locations(&self, node: &ComputationNode) -> Option<Vec<Location>> {
        let conf = self.load(node)?;
        self.inputs_from(node, &conf)
    }

    /// Both directions at once; the node's configuration is loaded a single time.
    pub fn resolve(&self, node: &ComputationNode) -> NodeLocations {
        let Some(conf) = self.load(node) else {
            return NodeLocations::default();
        };
        NodeLocations {
            inputs: self.inputs_from(node, &conf).unwrap_or_default(),
            output: self.output_from(node, &conf),
        }
    }

    /// All input and output locations across `nodes`, in node order.
    pub fn find_locations(&self, nodes: &[Arc<ComputationNode>]) -> (Vec<Location>, Vec<Location>) {
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for node in nodes {
            let found = self.resolve(node);
            inputs.extend(found.inputs);
            outputs.extend(found.output);
        }
        (inputs, outputs)
    }

    fn load(&self, node: &ComputationNode) -> Option<Configuration> {
        let source = node.binding.source()?;
        source
            .load()
            .map_err(|e| self.skip(node, "configuration", e))
            .ok()
    }

    fn output_from(&self, node: &ComputationNode, conf: &Configuration) -> Option<Location> {
        let raw = LegacyAccessor
            .output_dir(conf)
            .or_else(|| ModernAccessor.output_dir(conf))?;
        Location::resolve(raw, &self.default_fs)
            .map_err(|e| self.skip(node, "output", e))
            .ok()
    }

    fn inputs_from(&self, node: &ComputationNode, conf: &Configuration) -> Option<Vec<Location>> {
        let accessor = match &node.binding {
            StorageBinding::None => return None,
            StorageBinding::Legacy(_) => &LegacyAccessor as &dyn LocationAccessor,
            StorageBinding::Modern(_) => &ModernAccessor as &dyn LocationAccessor,
        };

        let dirs = accessor.input_dirs(conf);
        if dirs.is_empty() {
            return None;
        }
        dirs.iter()
            .map(|raw| Location::resolve(raw, &self.default_fs))
            .collect::<Result<Vec<_>, ResolutionError>>()
            .map_err(|e| self.skip(node, "input", e))
            .ok()
    }

    fn skip(&self, node: &ComputationNode, stage: &str, err: ResolutionError) {
        warn!(
            node = %node.id,
            operation = %node.operation,
            binding = node.binding.kind(),
            stage,
            error = %err,
            "could not resolve storage location; skipping"
        );
    }
}
