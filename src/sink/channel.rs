//! Non-blocking delivery through a background task
//!
//! `ChannelSink::emit()` only enqueues. A spawned task drains the queue
//! and hands each event to a `Transport`; failed deliveries are logged and
//! counted, never surfaced to the emitter.
//!
//! The queue is bounded. When the transport falls behind and the queue is
//! full, `emit()` drops the event with a warning rather than wait.

use super::EventSink;
use crate::event::LineageEvent;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Why a single delivery failed
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("collector rejected event: {0}")]
    Rejected(String),
}

/// Delivers one event to a collector.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, event: &LineageEvent) -> Result<(), TransportError>;
}

/// Writes each event as one JSON line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutTransport;

#[async_trait]
impl Transport for StdoutTransport {
    async fn deliver(&self, event: &LineageEvent) -> Result<(), TransportError> {
        let mut line = event.to_json()?;
        line.push('\n');
        let mut stdout = tokio::io::stdout();
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Counts reported by the delivery task when the sink closes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: usize,
    pub failed: usize,
}

/// Events the queue holds before `emit()` starts dropping
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// An `EventSink` backed by a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<LineageEvent>,
    dropped: Arc<AtomicUsize>,
}

impl ChannelSink {
    /// Spawn the delivery task on the current tokio runtime, with a queue
    /// of `DEFAULT_QUEUE_CAPACITY` events.
    ///
    /// The task ends, returning its stats, once every clone of the sink has
    /// been dropped and the queue is drained.
    pub fn spawn<T>(transport: T) -> (Self, JoinHandle<DeliveryStats>)
    where
        T: Transport + 'static,
    {
        Self::with_capacity(transport, DEFAULT_QUEUE_CAPACITY)
    }

    /// Like `spawn`, with a queue of `capacity` events (at least one).
    pub fn with_capacity<T>(transport: T, capacity: usize) -> (Self, JoinHandle<DeliveryStats>)
    where
        T: Transport + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<LineageEvent>(capacity.max(1));

        let handle = tokio::spawn(async move {
            let mut stats = DeliveryStats::default();
            while let Some(event) = rx.recv().await {
                match transport.deliver(&event).await {
                    Ok(()) => {
                        stats.delivered += 1;
                        debug!(event_type = %event.event_type, run_id = %event.run.run_id, "lineage event delivered");
                    }
                    Err(e) => {
                        stats.failed += 1;
                        warn!(event_type = %event.event_type, run_id = %event.run.run_id, error = %e, "lineage event delivery failed");
                    }
                }
            }
            stats
        });

        let sink = Self {
            tx,
            dropped: Arc::new(AtomicUsize::new(0)),
        };
        (sink, handle)
    }

    /// Events discarded because the queue was full or the task was gone
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: LineageEvent) {
        let (reason, event) = match self.tx.try_send(event) {
            Ok(()) => return,
            Err(TrySendError::Full(event)) => ("delivery queue full", event),
            Err(TrySendError::Closed(event)) => ("delivery task gone", event),
        };
        self.dropped.fetch_add(1, Ordering::Relaxed);
        warn!(event_type = %event.event_type, run_id = %event.run.run_id, reason, "dropping lineage event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use crate::sink::tests::sample_event;

    struct Recording {
        seen: Arc<AtomicUsize>,
        fail_every_other: bool,
    }

    #[async_trait]
    impl Transport for Recording {
        async fn deliver(&self, _event: &LineageEvent) -> Result<(), TransportError> {
            let n = self.seen.fetch_add(1, Ordering::SeqCst);
            if self.fail_every_other && n % 2 == 1 {
                return Err(TransportError::Rejected("503".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn delivers_all_events_then_reports_stats() {
        let seen = Arc::new(AtomicUsize::new(0));
        let (sink, handle) = ChannelSink::spawn(Recording {
            seen: seen.clone(),
            fail_every_other: false,
        });

        sink.emit(sample_event(EventType::Start));
        sink.emit(sample_event(EventType::Complete));
        drop(sink);

        let stats = handle.await.unwrap();
        assert_eq!(stats, DeliveryStats { delivered: 2, failed: 0 });
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn transport_failures_are_counted_not_raised() {
        let (sink, handle) = ChannelSink::spawn(Recording {
            seen: Arc::new(AtomicUsize::new(0)),
            fail_every_other: true,
        });

        for _ in 0..4 {
            sink.emit(sample_event(EventType::Start));
        }
        drop(sink);

        let stats = handle.await.unwrap();
        assert_eq!(stats, DeliveryStats { delivered: 2, failed: 2 });
    }

    #[tokio::test]
    async fn emit_after_task_ends_does_not_panic() {
        let (sink, handle) = ChannelSink::spawn(Recording {
            seen: Arc::new(AtomicUsize::new(0)),
            fail_every_other: false,
        });
        handle.abort();
        let _ = handle.await;

        sink.emit(sample_event(EventType::Fail));
        assert_eq!(sink.dropped(), 1);
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        // The current-thread runtime does not poll the delivery task until
        // this test yields, so nothing drains the queue while emitting.
        let seen = Arc::new(AtomicUsize::new(0));
        let (sink, handle) = ChannelSink::with_capacity(
            Recording {
                seen: seen.clone(),
                fail_every_other: false,
            },
            2,
        );

        for _ in 0..5 {
            sink.emit(sample_event(EventType::Start));
        }
        assert_eq!(sink.dropped(), 3);
        drop(sink);

        let stats = handle.await.unwrap();
        assert_eq!(stats, DeliveryStats { delivered: 2, failed: 0 });
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
