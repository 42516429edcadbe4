//! Event emission sinks
//!
//! The sink is the interface through which execution contexts hand events
//! to the outside world. `emit()` is synchronous and must not block: it is
//! called from the host's dispatch thread. Delivery failures stay inside
//! the sink.

mod channel;

pub use channel::{
    ChannelSink, DeliveryStats, StdoutTransport, Transport, TransportError, DEFAULT_QUEUE_CAPACITY,
};

use crate::event::LineageEvent;
use std::sync::Mutex;
use tracing::{info, warn};

/// Where lineage events go.
///
/// Shared across all jobs in flight, hence `Send + Sync`.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LineageEvent);
}

/// Collects events in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LineageEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<LineageEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Drain and return all collected events
    pub fn take(&self) -> Vec<LineageEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: LineageEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(_) => warn!("memory sink poisoned; dropping {} event", event.event_type),
        }
    }
}

/// Logs each event as a JSON line at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: LineageEvent) {
        match event.to_json() {
            Ok(json) => info!(target: "lineage::event", event_type = %event.event_type, "{}", json),
            Err(e) => warn!(error = %e, "failed to serialize lineage event"),
        }
    }
}
