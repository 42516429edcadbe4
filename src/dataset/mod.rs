//! Dataset identity and the normalizers that produce it

mod normalizer;
mod rules;

pub use normalizer::{DatasetNormalizer, SchemeRegistry};
pub use rules::{AuthorityRule, JdbcRule, LocalFileRule, SchemeRule};

use serde::{Deserialize, Serialize};

/// Canonical identity of one storage location.
///
/// Two datasets are the same dataset iff namespace and name both match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dataset {
    pub namespace: String,
    pub name: String,
}

impl Dataset {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
