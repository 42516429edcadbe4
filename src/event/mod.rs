//! Lineage events: schema, assembly, and outcome classification

mod builder;
mod job_name;
mod outcome;
mod types;


pub use builder::{build, event_time};
pub use job_name::{derive_job_name, UNKNOWN_JOB};
pub use outcome::{classify, Classification, JobResult};
pub use types::{
    ErrorFacet, EventType, Job, JobException, LineageEvent, ParentRun, ParentRunFacet, Run,
    RunFacet, ERROR_FACET_KEY, PRODUCER,
};
