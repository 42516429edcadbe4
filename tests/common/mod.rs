//! Common test utilities for lineage integration tests
//!
//! Graph builders for the node shapes hosts produce, plus an agent wired
//! to an in-memory sink.

pub mod graph_builder;

pub use graph_builder::{legacy_reader, modern_reader, modern_writer, transform, Unreadable};

use lineage::{LineageAgent, LineageConfig, LineageListener, MemorySink};
use std::sync::Arc;

/// An agent for namespace `etl` and app `My ETL Job`, emitting into `sink`
pub fn agent(sink: Arc<MemorySink>) -> Arc<LineageAgent> {
    let config = LineageConfig::default()
        .with_namespace("etl")
        .with_app_name("My ETL Job");
    Arc::new(LineageAgent::new(config, sink).expect("default config is valid"))
}

pub fn listener() -> (LineageListener, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (LineageListener::new(agent(sink.clone())), sink)
}
