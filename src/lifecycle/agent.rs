//! Process-wide collaborators shared by every execution context

use crate::binding::BindingResolver;
use crate::config::LineageConfig;
use crate::dataset::{DatasetNormalizer, SchemeRegistry};
use crate::error::LineageResult;
use crate::event::{derive_job_name, Job, ParentRunFacet};
use crate::sink::EventSink;
use std::sync::Arc;

/// Configuration, normalizer and sink, shared across concurrent jobs.
///
/// Holds no per-job state; that lives in `ExecutionContext`.
pub struct LineageAgent {
    config: LineageConfig,
    resolver: BindingResolver,
    normalizer: Arc<dyn DatasetNormalizer>,
    sink: Arc<dyn EventSink>,
}

impl LineageAgent {
    /// Agent with the built-in scheme rules.
    pub fn new(config: LineageConfig, sink: Arc<dyn EventSink>) -> LineageResult<Self> {
        Self::with_normalizer(config, Arc::new(SchemeRegistry::with_defaults()), sink)
    }

    pub fn with_normalizer(
        config: LineageConfig,
        normalizer: Arc<dyn DatasetNormalizer>,
        sink: Arc<dyn EventSink>,
    ) -> LineageResult<Self> {
        let resolver = BindingResolver::new(config.default_fs_location()?);
        Ok(Self {
            config,
            resolver,
            normalizer,
            sink,
        })
    }

    pub fn config(&self) -> &LineageConfig {
        &self.config
    }

    pub fn resolver(&self) -> &BindingResolver {
        &self.resolver
    }

    pub fn normalizer(&self) -> &dyn DatasetNormalizer {
        self.normalizer.as_ref()
    }

    pub fn sink(&self) -> &dyn EventSink {
        self.sink.as_ref()
    }

    /// The job identity every event from this application reports
    pub fn job(&self) -> Job {
        Job::new(
            self.config.namespace.clone(),
            derive_job_name(self.config.app_name.as_deref()),
        )
    }

    pub fn parent_facet(&self) -> ParentRunFacet {
        ParentRunFacet::new(
            self.config.parent_run_id.clone(),
            &self.config.namespace,
            &self.config.parent_job_name,
        )
    }
}

impl std::fmt::Debug for LineageAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineageAgent")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, LineageError};
    use crate::sink::MemorySink;

    #[test]
    fn job_name_derives_from_app_name() {
        let config = LineageConfig::default()
            .with_namespace("etl")
            .with_app_name("My ETL Job");
        let agent = LineageAgent::new(config, Arc::new(MemorySink::new())).unwrap();
        assert_eq!(agent.job(), Job::new("etl", "my_etl_job"));
    }

    #[test]
    fn job_name_defaults_to_unknown() {
        let agent = LineageAgent::new(LineageConfig::default(), Arc::new(MemorySink::new())).unwrap();
        assert_eq!(agent.job().name, "unknown");
    }

    #[test]
    fn parent_facet_uses_configured_parent() {
        let mut config = LineageConfig::default().with_namespace("etl");
        config.parent_run_id = "run-1".to_string();
        config.parent_job_name = "nightly_dag".to_string();
        let agent = LineageAgent::new(config, Arc::new(MemorySink::new())).unwrap();

        let parent = agent.parent_facet();
        assert_eq!(parent.run.run_id, "run-1");
        assert_eq!(parent.job, Job::new("etl", "nightly_dag"));
    }

    #[test]
    fn bad_default_fs_fails_construction() {
        let mut config = LineageConfig::default();
        config.default_fs = "nowhere".to_string();
        let err = LineageAgent::new(config, Arc::new(MemorySink::new())).unwrap_err();
        assert!(matches!(err, LineageError::Config(ConfigError::Invalid(_))));
    }
}
