//! Lineage event schema
//!
//! Field names and nesting are the wire contract with the collector:
//! `eventType`, `eventTime`, `producer`, `job`, `run{runId, facets}`,
//! `inputs`, `outputs`. Additional run facets are flattened next to
//! `parent` inside `run.facets`.

use crate::dataset::Dataset;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// URI identifying this emitter and its version
pub const PRODUCER: &str = concat!(
    "https://github.com/lineage-rs/lineage/tree/",
    env!("CARGO_PKG_VERSION")
);

const PARENT_RUN_FACET_SCHEMA: &str =
    "https://openlineage.io/spec/1-0-0/OpenLineage.json#/definitions/ParentRunFacet";
const ERROR_FACET_SCHEMA: &str =
    "https://openlineage.io/spec/1-0-0/OpenLineage.json#/definitions/ErrorFacet";

/// Key under which a failed job's error facet is attached
pub const ERROR_FACET_KEY: &str = "spark.exception";

/// Lifecycle transition an event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Start,
    Complete,
    Fail,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Complete => "COMPLETE",
            Self::Fail => "FAIL",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Start)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the owning job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub namespace: String,
    pub name: String,
}

impl Job {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

/// Reference to the run one level up the orchestration tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRunFacet {
    #[serde(rename = "_producer")]
    pub producer: String,
    #[serde(rename = "_schemaURL")]
    pub schema_url: String,
    pub run: ParentRun,
    pub job: Job,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRun {
    #[serde(rename = "runId")]
    pub run_id: String,
}

impl ParentRunFacet {
    pub fn new(run_id: impl Into<String>, job_namespace: &str, job_name: &str) -> Self {
        Self {
            producer: PRODUCER.to_string(),
            schema_url: PARENT_RUN_FACET_SCHEMA.to_string(),
            run: ParentRun {
                run_id: run_id.into(),
            },
            job: Job::new(job_namespace, job_name),
        }
    }
}

/// An exception captured by the host when a job failed.
///
/// Carried through untouched; nothing here inspects its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobException {
    pub class_name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack_trace: Vec<String>,
}

impl JobException {
    pub fn new(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: message.into(),
            stack_trace: Vec::new(),
        }
    }

    pub fn with_stack_trace(mut self, frames: Vec<String>) -> Self {
        self.stack_trace = frames;
        self
    }
}

/// Run facet wrapping the exception of a failed job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFacet {
    #[serde(rename = "_producer")]
    pub producer: String,
    #[serde(rename = "_schemaURL")]
    pub schema_url: String,
    pub exception: JobException,
}

impl ErrorFacet {
    pub fn new(exception: JobException) -> Self {
        Self {
            producer: PRODUCER.to_string(),
            schema_url: ERROR_FACET_SCHEMA.to_string(),
            exception,
        }
    }
}

/// Run facets: the parent reference plus any additional named facets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFacet {
    pub parent: ParentRunFacet,
    #[serde(flatten)]
    pub additional: BTreeMap<String, serde_json::Value>,
}

impl RunFacet {
    pub fn new(parent: ParentRunFacet) -> Self {
        Self {
            parent,
            additional: BTreeMap::new(),
        }
    }

    /// Attach the error facet under `spark.exception`.
    pub fn with_error(mut self, error: ErrorFacet) -> Self {
        // Plain-data struct; serialization to a Value cannot fail
        if let Ok(value) = serde_json::to_value(error) {
            self.additional.insert(ERROR_FACET_KEY.to_string(), value);
        }
        self
    }

    /// The attached error facet, if any
    pub fn error(&self) -> Option<ErrorFacet> {
        self.additional
            .get(ERROR_FACET_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// One execution attempt of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    #[serde(rename = "runId")]
    pub run_id: Uuid,
    pub facets: RunFacet,
}

/// A lineage event for one lifecycle transition of a run.
///
/// Built once and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageEvent {
    pub event_type: EventType,
    pub event_time: DateTime<Utc>,
    pub producer: String,
    pub job: Job,
    pub run: Run,
    pub inputs: Vec<Dataset>,
    pub outputs: Vec<Dataset>,
}

impl LineageEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
