//! Recording log endpoints for testing
//!
//! Every call made on a `RecordingLogger` lands in a shared `Recording`,
//! so a test can keep a handle after the endpoint has been moved into
//! whatever owns it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::LogConfig;
use crate::endpoint::{LogEndpoint, LoggerFactory};
use crate::error::EndpointResult;
use crate::stats::{EndpointStatistics, TrafficCounters};

/// Calls observed by one kind of recording endpoint
#[derive(Debug, Default)]
pub struct Recording {
    /// Number of endpoints constructed
    pub created: usize,
    /// Target system id passed at the last construction
    pub target_system_id: Option<u8>,
    /// Configuration passed at the last construction
    pub config: Option<Arc<LogConfig>>,
    /// Packets written, in order
    pub packets: Vec<Vec<u8>>,
    /// Number of `stop` calls
    pub stops: usize,
    /// Number of `report_statistics` calls
    pub reports: usize,
}

/// Shared handle to a `Recording`
pub type SharedRecording = Arc<Mutex<Recording>>;

/// Endpoint that records every call
pub struct RecordingLogger {
    name: String,
    recording: SharedRecording,
    consumed: Option<usize>,
}

impl RecordingLogger {
    pub fn new(name: impl Into<String>, recording: SharedRecording) -> Self {
        Self {
            name: name.into(),
            recording,
            consumed: None,
        }
    }

    /// Report a fixed consumed length instead of the packet length
    pub fn with_consumed(mut self, consumed: usize) -> Self {
        self.consumed = Some(consumed);
        self
    }
}

impl LogEndpoint for RecordingLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_msg(&mut self, packet: &[u8]) -> EndpointResult<usize> {
        self.recording.lock().packets.push(packet.to_vec());
        Ok(self.consumed.unwrap_or(packet.len()))
    }

    fn stop(&mut self) {
        self.recording.lock().stops += 1;
    }

    fn report_statistics(&self) -> EndpointStatistics {
        let mut recording = self.recording.lock();
        recording.reports += 1;

        let mut written = TrafficCounters::default();
        for packet in &recording.packets {
            written.record(packet.len());
        }
        EndpointStatistics {
            endpoint: self.name.clone(),
            received: written,
            written,
            ..Default::default()
        }
    }
}

/// Factory handing out `RecordingLogger`s for both flight stacks
#[derive(Clone, Default)]
pub struct RecordingFactory {
    pub px4: SharedRecording,
    pub ardupilot: SharedRecording,
    consumed: Option<usize>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every created endpoint report `consumed` from `write_msg`
    pub fn with_consumed(mut self, consumed: usize) -> Self {
        self.consumed = Some(consumed);
        self
    }

    fn build(
        &self,
        name: &str,
        recording: &SharedRecording,
        config: Arc<LogConfig>,
        target_system_id: u8,
    ) -> RecordingLogger {
        {
            let mut rec = recording.lock();
            rec.created += 1;
            rec.target_system_id = Some(target_system_id);
            rec.config = Some(config);
        }
        let logger = RecordingLogger::new(name, Arc::clone(recording));
        match self.consumed {
            Some(consumed) => logger.with_consumed(consumed),
            None => logger,
        }
    }
}

impl LoggerFactory for RecordingFactory {
    type Px4 = RecordingLogger;
    type ArduPilot = RecordingLogger;

    fn px4(&self, config: Arc<LogConfig>, target_system_id: u8) -> RecordingLogger {
        self.build("px4-recorder", &self.px4, config, target_system_id)
    }

    fn ardupilot(&self, config: Arc<LogConfig>, target_system_id: u8) -> RecordingLogger {
        self.build("ardupilot-recorder", &self.ardupilot, config, target_system_id)
    }
}
