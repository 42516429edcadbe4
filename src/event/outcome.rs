//! Job outcome classification

use super::types::{ErrorFacet, EventType, JobException};

/// How the host reports a job's end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    Succeeded,
    /// The exception may be missing when the host did not capture one
    Failed(Option<JobException>),
    /// Killed before finishing; never carries an exception
    Cancelled,
}

impl JobResult {
    pub fn failed(exception: JobException) -> Self {
        Self::Failed(Some(exception))
    }
}

/// Terminal event type plus the error facet to attach, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub event_type: EventType,
    pub error: Option<ErrorFacet>,
}

/// COMPLETE iff the job succeeded; every other outcome is FAIL.
pub fn classify(result: &JobResult) -> Classification {
    match result {
        JobResult::Succeeded => Classification {
            event_type: EventType::Complete,
            error: None,
        },
        JobResult::Failed(exception) => Classification {
            event_type: EventType::Fail,
            error: exception.clone().map(ErrorFacet::new),
        },
        JobResult::Cancelled => Classification {
            event_type: EventType::Fail,
            error: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_complete_without_error() {
        let c = classify(&JobResult::Succeeded);
        assert_eq!(c.event_type, EventType::Complete);
        assert!(c.error.is_none());
    }

    #[test]
    fn failure_with_exception_carries_error_facet() {
        let e = JobException::new("java.io.IOException", "disk full");
        let c = classify(&JobResult::failed(e.clone()));
        assert_eq!(c.event_type, EventType::Fail);
        assert_eq!(c.error.unwrap().exception, e);
    }

    #[test]
    fn failure_without_exception_has_no_error_facet() {
        let c = classify(&JobResult::Failed(None));
        assert_eq!(c.event_type, EventType::Fail);
        assert!(c.error.is_none());
    }

    #[test]
    fn cancellation_is_fail() {
        let c = classify(&JobResult::Cancelled);
        assert_eq!(c.event_type, EventType::Fail);
        assert!(c.error.is_none());
    }
}
