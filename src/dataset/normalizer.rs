//! Pluggable dataset identity normalization

use super::rules::{AuthorityRule, JdbcRule, LocalFileRule, SchemeRule};
use super::Dataset;
use crate::binding::Location;
use crate::error::{LineageError, LineageResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Converts a storage location into its canonical dataset identity.
///
/// Shared by every job in flight, hence `Send + Sync`.
pub trait DatasetNormalizer: Send + Sync {
    /// Fails with `LineageError::UnsupportedScheme` when no rule applies.
    fn normalize(&self, location: &Location) -> LineageResult<Dataset>;
}

/// A normalizer dispatching on the location's scheme.
///
/// Lookup is by exact scheme first, then by the prefix before the first
/// `:`, so a single `jdbc` rule covers `jdbc:postgresql`, `jdbc:mysql`, etc.
#[derive(Clone, Default)]
pub struct SchemeRegistry {
    rules: HashMap<String, Arc<dyn SchemeRule>>,
}

impl SchemeRegistry {
    /// An empty registry; every location is unsupported until rules are added.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in rules.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("file", LocalFileRule);
        for scheme in ["hdfs", "webhdfs", "viewfs"] {
            registry.register(scheme, AuthorityRule);
        }
        for scheme in ["s3", "s3a", "s3n", "gs", "wasb", "wasbs", "abfs", "abfss"] {
            registry.register(scheme, AuthorityRule);
        }
        registry.register("jdbc", JdbcRule);
        registry
    }

    /// Register (or replace) the rule for a scheme.
    pub fn register(&mut self, scheme: impl Into<String>, rule: impl SchemeRule + 'static) {
        self.rules
            .insert(scheme.into().to_ascii_lowercase(), Arc::new(rule));
    }

    pub fn supports(&self, scheme: &str) -> bool {
        self.rule_for(scheme).is_some()
    }

    fn rule_for(&self, scheme: &str) -> Option<&Arc<dyn SchemeRule>> {
        self.rules.get(scheme).or_else(|| {
            scheme
                .split_once(':')
                .and_then(|(family, _)| self.rules.get(family))
        })
    }
}

impl std::fmt::Debug for SchemeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schemes: Vec<&String> = self.rules.keys().collect();
        schemes.sort();
        f.debug_struct("SchemeRegistry").field("schemes", &schemes).finish()
    }
}

impl DatasetNormalizer for SchemeRegistry {
    fn normalize(&self, location: &Location) -> LineageResult<Dataset> {
        self.rule_for(location.scheme())
            .map(|rule| rule.dataset(location))
            .ok_or_else(|| LineageError::UnsupportedScheme {
                scheme: location.scheme().to_string(),
                location: location.to_string(),
            })
    }
}
