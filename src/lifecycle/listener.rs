//! Host-facing listener tracking every job in flight
//!
//! The host calls the three hooks from its dispatch thread, in order per
//! job; different jobs interleave freely. Each job gets its own
//! `ExecutionContext`, created on first sight and dropped after its
//! terminal event.

use super::agent::LineageAgent;
use super::context::{ExecutionContext, JobId};
use crate::event::JobResult;
use crate::graph::ComputationNode;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::warn;

/// Entry points the host drives.
pub struct LineageListener {
    agent: Arc<LineageAgent>,
    contexts: DashMap<JobId, ExecutionContext>,
}

impl LineageListener {
    pub fn new(agent: Arc<LineageAgent>) -> Self {
        Self {
            agent,
            contexts: DashMap::new(),
        }
    }

    pub fn agent(&self) -> &Arc<LineageAgent> {
        &self.agent
    }

    /// The host determined the job's final computation node.
    pub fn on_final_node_bound(&self, job_id: JobId, root: &Arc<ComputationNode>) {
        let mut ctx = self.take(job_id);
        if let Err(e) = ctx.bind(root) {
            warn!(job_id = %job_id, error = %e, "final node binding ignored");
        }
        self.contexts.insert(job_id, ctx);
    }

    /// The host started the job.
    pub fn on_job_start(&self, job_id: JobId, epoch_millis: i64) {
        let mut ctx = self.take(job_id);
        ctx.start(epoch_millis);
        self.contexts.insert(job_id, ctx);
    }

    /// The host finished the job; its context is released afterwards.
    pub fn on_job_end(&self, job_id: JobId, epoch_millis: i64, result: &JobResult) {
        self.take(job_id).end(epoch_millis, result);
    }

    /// Moves the job's context out of the map, or creates one on first sight.
    ///
    /// Binding loads configurations and emitting may block, so no map guard
    /// is held while a hook runs. Hooks for one job arrive in sequence, so
    /// nothing else touches the context while it is out.
    fn take(&self, job_id: JobId) -> ExecutionContext {
        match self.contexts.remove(&job_id) {
            Some((_, ctx)) => ctx,
            None => ExecutionContext::new(job_id, self.agent.clone()),
        }
    }

    /// Number of jobs with a live context
    pub fn active_jobs(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_tracking(&self, job_id: JobId) -> bool {
        self.contexts.contains_key(&job_id)
    }
}

impl std::fmt::Debug for LineageListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineageListener")
            .field("active_jobs", &self.contexts.len())
            .finish_non_exhaustive()
    }
}
