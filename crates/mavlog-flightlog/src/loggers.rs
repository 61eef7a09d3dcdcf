//! PX4 and ArduPilot log endpoints

use std::fmt;
use std::sync::Arc;

use mavlog_core::{EndpointResult, EndpointStatistics, LogConfig, LogEndpoint, LoggerFactory};
use mavlog_proto::Autopilot;

use crate::capture::CaptureWriter;

/// Flight stack families with a dedicated logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightStack {
    Px4,
    ArduPilot,
}

impl FlightStack {
    /// Map a heartbeat's autopilot to the flight stack it belongs to
    pub fn from_autopilot(autopilot: Autopilot) -> Option<Self> {
        match autopilot {
            Autopilot::Px4 => Some(Self::Px4),
            Autopilot::ArduPilotMega => Some(Self::ArduPilot),
            _ => None,
        }
    }

    /// Short lowercase tag used in file and endpoint names
    pub fn tag(self) -> &'static str {
        match self {
            Self::Px4 => "px4",
            Self::ArduPilot => "ardupilot",
        }
    }
}

impl fmt::Display for FlightStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px4 => f.write_str("PX4"),
            Self::ArduPilot => f.write_str("ArduPilot"),
        }
    }
}

/// Log endpoint for PX4 autopilots
pub struct Px4Log {
    writer: CaptureWriter,
}

impl Px4Log {
    pub fn new(config: Arc<LogConfig>, target_system_id: u8) -> Self {
        Self {
            writer: CaptureWriter::new(FlightStack::Px4, config, target_system_id),
        }
    }

    pub fn writer(&self) -> &CaptureWriter {
        &self.writer
    }
}

impl LogEndpoint for Px4Log {
    fn name(&self) -> &str {
        self.writer.name()
    }

    fn write_msg(&mut self, packet: &[u8]) -> EndpointResult<usize> {
        self.writer.write_msg(packet)
    }

    fn stop(&mut self) {
        self.writer.stop()
    }

    fn report_statistics(&self) -> EndpointStatistics {
        self.writer.report_statistics()
    }
}

/// Log endpoint for ArduPilot autopilots
pub struct ArduPilotLog {
    writer: CaptureWriter,
}

impl ArduPilotLog {
    pub fn new(config: Arc<LogConfig>, target_system_id: u8) -> Self {
        Self {
            writer: CaptureWriter::new(FlightStack::ArduPilot, config, target_system_id),
        }
    }

    pub fn writer(&self) -> &CaptureWriter {
        &self.writer
    }
}

impl LogEndpoint for ArduPilotLog {
    fn name(&self) -> &str {
        self.writer.name()
    }

    fn write_msg(&mut self, packet: &[u8]) -> EndpointResult<usize> {
        self.writer.write_msg(packet)
    }

    fn stop(&mut self) {
        self.writer.stop()
    }

    fn report_statistics(&self) -> EndpointStatistics {
        self.writer.report_statistics()
    }
}

/// Factory producing the file-backed endpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoggerFactory;

impl LoggerFactory for FileLoggerFactory {
    type Px4 = Px4Log;
    type ArduPilot = ArduPilotLog;

    fn px4(&self, config: Arc<LogConfig>, target_system_id: u8) -> Px4Log {
        Px4Log::new(config, target_system_id)
    }

    fn ardupilot(&self, config: Arc<LogConfig>, target_system_id: u8) -> ArduPilotLog {
        ArduPilotLog::new(config, target_system_id)
    }
}
