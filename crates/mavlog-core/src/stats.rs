//! Endpoint statistics
//!
//! `EndpointStats` is the generic reporter every endpoint can fall back on.
//! Flight-stack loggers report richer snapshots through the same
//! `EndpointStatistics` type.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Packet and byte counters for one traffic direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficCounters {
    /// Number of packets
    pub packets: u64,
    /// Number of bytes
    pub bytes: u64,
}

impl TrafficCounters {
    /// Account for one packet of `len` bytes
    pub fn record(&mut self, len: usize) {
        self.packets += 1;
        self.bytes += len as u64;
    }
}

/// Statistics snapshot of a log endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointStatistics {
    /// Endpoint name
    pub endpoint: String,
    /// Packets handed to the endpoint
    pub received: TrafficCounters,
    /// Packets persisted by the endpoint
    pub written: TrafficCounters,
    /// Packets consumed without being persisted
    pub dropped: u64,
    /// Number of log files opened so far
    pub files_opened: u32,
    /// Log file currently being written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl EndpointStatistics {
    /// Emit the snapshot as a structured log event
    pub fn log(&self) {
        info!(
            endpoint = %self.endpoint,
            received_packets = self.received.packets,
            received_bytes = self.received.bytes,
            written_packets = self.written.packets,
            written_bytes = self.written.bytes,
            dropped = self.dropped,
            files_opened = self.files_opened,
            log_file = ?self.log_file,
            "Endpoint statistics"
        );
    }
}

/// Generic statistics reporter supplied to endpoints that have nothing
/// more specific to say.
///
/// The surrounding router records traffic here; the owning endpoint
/// reports it when asked.
#[derive(Debug, Clone)]
pub struct EndpointStats {
    name: String,
    received: TrafficCounters,
    written: TrafficCounters,
    dropped: u64,
}

impl EndpointStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            received: TrafficCounters::default(),
            written: TrafficCounters::default(),
            dropped: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a packet received from the link
    pub fn record_received(&mut self, len: usize) {
        self.received.record(len);
    }

    /// Record a packet written to the link
    pub fn record_written(&mut self, len: usize) {
        self.written.record(len);
    }

    /// Record a packet that was discarded
    pub fn record_dropped(&mut self) {
        self.dropped += 1;
    }

    /// Current counters without logging
    pub fn snapshot(&self) -> EndpointStatistics {
        EndpointStatistics {
            endpoint: self.name.clone(),
            received: self.received,
            written: self.written,
            dropped: self.dropped,
            files_opened: 0,
            log_file: None,
        }
    }

    /// Log and return the current counters
    pub fn report(&self) -> EndpointStatistics {
        let stats = self.snapshot();
        stats.log();
        stats
    }
}
