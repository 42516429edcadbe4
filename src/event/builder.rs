//! Event assembly

use super::types::{EventType, Job, LineageEvent, Run, PRODUCER};
use crate::dataset::Dataset;
use chrono::{DateTime, Utc};

/// Convert a host epoch-millisecond timestamp to a UTC instant.
///
/// `None` only for instants chrono cannot represent.
pub fn event_time(epoch_millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(epoch_millis)
}

/// Assemble an event. Pure; the producer URI is fixed.
pub fn build(
    event_type: EventType,
    time: DateTime<Utc>,
    job: Job,
    run: Run,
    inputs: Vec<Dataset>,
    outputs: Vec<Dataset>,
) -> LineageEvent {
    LineageEvent {
        event_type,
        event_time: time,
        producer: PRODUCER.to_string(),
        job,
        run,
        inputs,
        outputs,
    }
}
