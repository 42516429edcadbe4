//! Per-job execution context
//!
//! Lifecycle: `Created → Bound → Started → Terminal`.
//! - bind: flatten the final node's graph, resolve and normalize its
//!   storage locations, cache the dataset lists (once)
//! - start: emit START from the cache
//! - end: classify the outcome, emit COMPLETE or FAIL from the same cache
//!
//! Out-of-order calls are host integration bugs. They are logged and
//! tolerated: a context that was never bound emits empty dataset lists,
//! and nothing here panics on the host's dispatch thread.

use super::agent::LineageAgent;
use crate::binding::Location;
use crate::dataset::Dataset;
use crate::error::{LineageError, LineageResult};
use crate::event::{build, classify, event_time, EventType, JobResult, LineageEvent, Run, RunFacet};
use crate::graph::{flatten, ComputationNode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Host-assigned job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a context is in its job's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Bound,
    Started,
    Terminal(EventType),
}

/// Mutable per-job holder. One per job attempt; never shared across jobs.
#[derive(Debug)]
pub struct ExecutionContext {
    job_id: JobId,
    run_id: Uuid,
    agent: Arc<LineageAgent>,
    state: LifecycleState,
    inputs: Vec<Dataset>,
    outputs: Vec<Dataset>,
}

impl ExecutionContext {
    pub fn new(job_id: JobId, agent: Arc<LineageAgent>) -> Self {
        Self {
            job_id,
            run_id: Uuid::new_v4(),
            agent,
            state: LifecycleState::Created,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn inputs(&self) -> &[Dataset] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Dataset] {
        &self.outputs
    }

    /// Resolve the job's datasets from its final computation node.
    ///
    /// Allowed once, before either lifecycle hook; any later call returns
    /// `AlreadyBound` and leaves the cached lists untouched.
    pub fn bind(&mut self, root: &Arc<ComputationNode>) -> LineageResult<()> {
        if self.state != LifecycleState::Created {
            warn!(job_id = %self.job_id, state = ?self.state, "bind called more than once or after start");
            return Err(LineageError::AlreadyBound);
        }

        let nodes = flatten(root);
        let resolver = self.agent.resolver();
        let (inputs, outputs) = resolver.find_locations(&nodes);

        self.inputs = self.normalize_all(&inputs);
        self.outputs = self.normalize_all(&outputs);
        self.state = LifecycleState::Bound;

        debug!(
            job_id = %self.job_id,
            nodes = nodes.len(),
            inputs = self.inputs.len(),
            outputs = self.outputs.len(),
            "execution context bound"
        );
        Ok(())
    }

    /// Host notification: the job started at `epoch_millis`.
    pub fn start(&mut self, epoch_millis: i64) {
        match self.state {
            LifecycleState::Bound => {}
            LifecycleState::Created => {
                warn!(job_id = %self.job_id, "job started before its final node was bound; emitting without datasets");
            }
            LifecycleState::Started | LifecycleState::Terminal(_) => {
                warn!(job_id = %self.job_id, state = ?self.state, "duplicate start ignored");
                return;
            }
        }

        let event = self.event(EventType::Start, epoch_millis, RunFacet::new(self.agent.parent_facet()));
        self.state = LifecycleState::Started;
        self.emit(event);
    }

    /// Host notification: the job ended at `epoch_millis` with `result`.
    pub fn end(&mut self, epoch_millis: i64, result: &JobResult) {
        match self.state {
            LifecycleState::Started => {}
            LifecycleState::Created | LifecycleState::Bound => {
                warn!(job_id = %self.job_id, state = ?self.state, "job ended without a start notification");
            }
            LifecycleState::Terminal(_) => {
                warn!(job_id = %self.job_id, "duplicate end ignored");
                return;
            }
        }

        let classification = classify(result);
        let mut facets = RunFacet::new(self.agent.parent_facet());
        if let Some(error) = classification.error {
            facets = facets.with_error(error);
        }

        let event = self.event(classification.event_type, epoch_millis, facets);
        self.state = LifecycleState::Terminal(classification.event_type);
        self.emit(event);
    }

    fn event(&self, event_type: EventType, epoch_millis: i64, facets: RunFacet) -> LineageEvent {
        let time = event_time(epoch_millis).unwrap_or_else(|| {
            warn!(job_id = %self.job_id, epoch_millis, "unrepresentable event time; using current time");
            Utc::now()
        });
        build(
            event_type,
            time,
            self.agent.job(),
            Run {
                run_id: self.run_id,
                facets,
            },
            self.inputs.clone(),
            self.outputs.clone(),
        )
    }

    fn emit(&self, event: LineageEvent) {
        info!(
            job_id = %self.job_id,
            run_id = %self.run_id,
            event_type = %event.event_type,
            inputs = event.inputs.len(),
            outputs = event.outputs.len(),
            "emitting lineage event"
        );
        self.agent.sink().emit(event);
    }

    /// Unsupported schemes drop just that dataset.
    fn normalize_all(&self, locations: &[Location]) -> Vec<Dataset> {
        locations
            .iter()
            .filter_map(|location| match self.agent.normalizer().normalize(location) {
                Ok(dataset) => Some(dataset),
                Err(e) => {
                    warn!(job_id = %self.job_id, location = %location, error = %e, "dropping dataset");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Configuration, LEGACY_INPUT_DIR, MODERN_OUTPUT_DIR};
    use crate::config::LineageConfig;
    use crate::event::{JobException, ERROR_FACET_KEY};
    use crate::graph::StorageBinding;
    use crate::sink::MemorySink;

    fn agent(sink: Arc<MemorySink>) -> Arc<LineageAgent> {
        let config = LineageConfig::default()
            .with_namespace("etl")
            .with_app_name("My ETL Job");
        Arc::new(LineageAgent::new(config, sink).unwrap())
    }

    fn read_write_graph() -> Arc<ComputationNode> {
        let read = ComputationNode::new("HadoopRDD")
            .with_binding(StorageBinding::legacy(
                Configuration::new().with(LEGACY_INPUT_DIR, "file:///data/in"),
            ))
            .into_arc();
        let map = ComputationNode::new("map").depends_on(read).into_arc();
        ComputationNode::new("saveAsNewAPIHadoopFile")
            .with_binding(StorageBinding::modern(
                Configuration::new().with(MODERN_OUTPUT_DIR, "file:///data/out"),
            ))
            .depends_on(map)
            .into_arc()
    }

    #[test]
    fn full_lifecycle_emits_start_then_complete() {
        let sink = Arc::new(MemorySink::new());
        let mut ctx = ExecutionContext::new(JobId(1), agent(sink.clone()));

        ctx.bind(&read_write_graph()).unwrap();
        assert_eq!(ctx.state(), LifecycleState::Bound);
        ctx.start(1_000);
        ctx.end(2_000, &JobResult::Succeeded);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::Start);
        assert_eq!(events[1].event_type, EventType::Complete);
        assert_eq!(events[0].inputs, vec![Dataset::new("file", "/data/in")]);
        assert_eq!(events[0].outputs, vec![Dataset::new("file", "/data/out")]);
        assert_eq!(events[0].inputs, events[1].inputs);
        assert_eq!(events[0].outputs, events[1].outputs);
        assert_eq!(events[0].run.run_id, events[1].run.run_id);
        assert!(events[1].run.facets.additional.is_empty());
        assert_eq!(ctx.state(), LifecycleState::Terminal(EventType::Complete));
    }

    #[test]
    fn failure_attaches_error_facet() {
        let sink = Arc::new(MemorySink::new());
        let mut ctx = ExecutionContext::new(JobId(2), agent(sink.clone()));
        let exception = JobException::new("org.apache.spark.SparkException", "task 3 failed");

        ctx.bind(&read_write_graph()).unwrap();
        ctx.start(1_000);
        ctx.end(2_000, &JobResult::failed(exception.clone()));

        let end = &sink.events()[1];
        assert_eq!(end.event_type, EventType::Fail);
        assert!(end.run.facets.additional.contains_key(ERROR_FACET_KEY));
        assert_eq!(end.run.facets.error().unwrap().exception, exception);
    }

    #[test]
    fn second_bind_is_rejected_and_cache_kept() {
        let sink = Arc::new(MemorySink::new());
        let mut ctx = ExecutionContext::new(JobId(3), agent(sink));

        ctx.bind(&read_write_graph()).unwrap();
        let other = ComputationNode::new("map").into_arc();
        assert!(matches!(ctx.bind(&other), Err(LineageError::AlreadyBound)));
        assert_eq!(ctx.inputs().len(), 1);
        assert_eq!(ctx.outputs().len(), 1);
    }

    #[test]
    fn start_without_bind_emits_empty_lists() {
        let sink = Arc::new(MemorySink::new());
        let mut ctx = ExecutionContext::new(JobId(4), agent(sink.clone()));

        ctx.start(1_000);
        ctx.end(2_000, &JobResult::Cancelled);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.inputs.is_empty() && e.outputs.is_empty()));
        assert_eq!(events[1].event_type, EventType::Fail);
        assert!(events[1].run.facets.error().is_none());
    }

    #[test]
    fn bind_after_start_is_rejected() {
        let sink = Arc::new(MemorySink::new());
        let mut ctx = ExecutionContext::new(JobId(5), agent(sink.clone()));

        ctx.start(1_000);
        assert!(ctx.bind(&read_write_graph()).is_err());
        ctx.end(2_000, &JobResult::Succeeded);
        assert!(sink.events()[1].inputs.is_empty());
    }

    #[test]
    fn duplicate_hooks_emit_nothing_more() {
        let sink = Arc::new(MemorySink::new());
        let mut ctx = ExecutionContext::new(JobId(6), agent(sink.clone()));

        ctx.bind(&read_write_graph()).unwrap();
        ctx.start(1_000);
        ctx.start(1_001);
        ctx.end(2_000, &JobResult::Succeeded);
        ctx.end(2_001, &JobResult::Failed(None));
        ctx.start(3_000);

        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn end_without_start_still_emits_terminal() {
        let sink = Arc::new(MemorySink::new());
        let mut ctx = ExecutionContext::new(JobId(7), agent(sink.clone()));

        ctx.bind(&read_write_graph()).unwrap();
        ctx.end(2_000, &JobResult::Succeeded);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Complete);
        assert_eq!(events[0].inputs.len(), 1);
    }

    #[test]
    fn event_time_is_utc_from_millis() {
        let sink = Arc::new(MemorySink::new());
        let mut ctx = ExecutionContext::new(JobId(8), agent(sink.clone()));

        ctx.start(1_612_345_678_901);
        assert_eq!(sink.events()[0].event_time.timestamp_millis(), 1_612_345_678_901);
    }

    #[test]
    fn unsupported_scheme_drops_only_that_dataset() {
        let read = ComputationNode::new("HadoopRDD")
            .with_binding(StorageBinding::legacy(
                Configuration::new().with(LEGACY_INPUT_DIR, "ftp://host/a,file:///data/b"),
            ))
            .into_arc();

        let sink = Arc::new(MemorySink::new());
        let mut ctx = ExecutionContext::new(JobId(9), agent(sink));
        ctx.bind(&read).unwrap();
        assert_eq!(ctx.inputs(), &[Dataset::new("file", "/data/b")]);
    }
}
