//! Lineage: data-lineage extraction for batch jobs
//!
//! Recovers which datasets a job read and wrote by walking its computation
//! graph, and reports them as lineage events at job start and job end.
//!
//! # Core Concepts
//!
//! - **Computation nodes**: the job's dependency graph, some nodes bound to
//!   external storage through a legacy or modern job configuration
//! - **Datasets**: canonical `(namespace, name)` identities of storage locations
//! - **Execution contexts**: per-job state machines that resolve datasets once
//!   and emit START and COMPLETE/FAIL events from the same cached lists
//!
//! # Example
//!
//! ```
//! use lineage::{
//!     ComputationNode, Configuration, JobId, JobResult, LineageAgent, LineageConfig,
//!     LineageListener, MemorySink, StorageBinding,
//! };
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let agent = LineageAgent::new(LineageConfig::default(), sink.clone()).unwrap();
//! let listener = LineageListener::new(Arc::new(agent));
//!
//! let read = ComputationNode::new("HadoopRDD")
//!     .with_binding(StorageBinding::legacy(
//!         Configuration::new().with("mapred.input.dir", "file:///data/in"),
//!     ))
//!     .into_arc();
//!
//! listener.on_final_node_bound(JobId(0), &read);
//! listener.on_job_start(JobId(0), 1_000);
//! listener.on_job_end(JobId(0), 2_000, &JobResult::Succeeded);
//! assert_eq!(sink.len(), 2);
//! ```

pub mod binding;
pub mod config;
pub mod dataset;
pub mod error;
pub mod event;
pub mod graph;
pub mod lifecycle;
pub mod sink;

pub use binding::{BindingResolver, ConfigSource, Configuration, Location};
pub use config::LineageConfig;
pub use dataset::{Dataset, DatasetNormalizer, SchemeRegistry, SchemeRule};
pub use error::{ConfigError, LineageError, LineageResult, ResolutionError};
pub use event::{
    classify, EventType, Job, JobException, JobResult, LineageEvent, Run, RunFacet, PRODUCER,
};
pub use graph::{flatten, ComputationNode, JobPlan, NodeId, StorageBinding};
pub use lifecycle::{ExecutionContext, JobId, LifecycleState, LineageAgent, LineageListener};
pub use sink::{ChannelSink, EventSink, LogSink, MemorySink, StdoutTransport, Transport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
