//! Error taxonomy for lineage extraction
//!
//! Nothing here is allowed to reach the host's dispatch thread as a panic.
//! Per-node failures are `ResolutionError`s and are absorbed by the resolver;
//! everything else surfaces as a `LineageError` that the lifecycle layer logs.

use thiserror::Error;

/// A single node's storage binding could not be read.
///
/// Recoverable: the node contributes no locations and traversal continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("configuration unavailable: {0}")]
    Io(String),

    #[error("malformed location '{raw}': {reason}")]
    MalformedLocation { raw: String, reason: String },
}

impl ResolutionError {
    pub fn malformed(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedLocation {
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading agent configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur in lineage operations
#[derive(Debug, Error)]
pub enum LineageError {
    #[error("no naming rule for scheme '{scheme}' (location {location})")]
    UnsupportedScheme { scheme: String, location: String },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("execution context already bound")]
    AlreadyBound,

    #[error("invalid job plan: {0}")]
    Plan(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for lineage operations
pub type LineageResult<T> = Result<T, LineageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_scheme_names_scheme_and_location() {
        let err = LineageError::UnsupportedScheme {
            scheme: "ftp".to_string(),
            location: "ftp://host/file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'ftp'"));
        assert!(msg.contains("ftp://host/file"));
    }

    #[test]
    fn resolution_error_is_transparent() {
        let err: LineageError = ResolutionError::Io("disk gone".to_string()).into();
        assert_eq!(err.to_string(), "configuration unavailable: disk gone");
    }
}
