//! Job lifecycle: per-job execution contexts and the host listener

mod agent;
mod context;
mod listener;

pub use agent::LineageAgent;
pub use context::{ExecutionContext, JobId, LifecycleState};
pub use listener::LineageListener;
