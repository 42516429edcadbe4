//! Job configuration objects attached to storage-bound nodes

use crate::error::ResolutionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Old-style (mapred) input directory list
pub const LEGACY_INPUT_DIR: &str = "mapred.input.dir";
/// Old-style (mapred) output directory
pub const LEGACY_OUTPUT_DIR: &str = "mapred.output.dir";
/// New-style (mapreduce) input directory list
pub const MODERN_INPUT_DIR: &str = "mapreduce.input.fileinputformat.inputdir";
/// New-style (mapreduce) output directory
pub const MODERN_OUTPUT_DIR: &str = "mapreduce.output.fileoutputformat.outputdir";

/// A flat key/value job configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    properties: BTreeMap<String, String>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, replacing any previous value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Look up a property; blank values read as unset
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Whatever the host attached to a node as its job configuration.
///
/// Loading may touch external state (serialized job files, broadcast
/// variables), so it can fail. A failure is recoverable: the node simply
/// contributes no locations.
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    fn load(&self) -> Result<Configuration, ResolutionError>;
}

impl ConfigSource for Configuration {
    fn load(&self) -> Result<Configuration, ResolutionError> {
        Ok(self.clone())
    }
}

/// Split a comma-separated directory list, honouring `\,` as an escaped comma.
pub fn split_dir_list(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
