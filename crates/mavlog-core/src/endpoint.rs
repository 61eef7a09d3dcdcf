//! LogEndpoint trait - the core abstraction for flight log backends

use std::sync::Arc;

use crate::config::LogConfig;
use crate::error::EndpointResult;
use crate::stats::EndpointStatistics;

/// The trait that every packet-consuming log endpoint implements.
///
/// Packets are handed over one at a time, fully framed, in stream order.
/// The same interface is served by:
/// - `Px4Log` / `ArduPilotLog` - capture writers for a known flight stack
/// - `AutoLog` - the gate that detects the flight stack and binds one of them
///
/// Endpoints are driven from a single packet-processing context, hence
/// `&mut self` everywhere and no internal synchronization.
pub trait LogEndpoint: Send {
    /// Endpoint name used in diagnostics and statistics
    fn name(&self) -> &str;

    /// Acquire resources up front. Endpoints that open lazily keep the default.
    fn start(&mut self) -> EndpointResult<()> {
        Ok(())
    }

    /// Consume one framed packet, returning the number of bytes consumed
    fn write_msg(&mut self, packet: &[u8]) -> EndpointResult<usize>;

    /// Flush and release resources. Must be idempotent.
    fn stop(&mut self) {}

    /// Produce (and log) a statistics snapshot
    fn report_statistics(&self) -> EndpointStatistics;
}

/// Builds the flight-stack specific endpoints an `AutoLog` gate can bind to.
///
/// Construction cannot fail: endpoints acquire their files lazily, so a
/// backend that later hits an I/O error reports it from `write_msg`.
pub trait LoggerFactory {
    /// Endpoint used for PX4 autopilots
    type Px4: LogEndpoint;
    /// Endpoint used for ArduPilot autopilots
    type ArduPilot: LogEndpoint;

    /// Create the PX4 endpoint for the given target system
    fn px4(&self, config: Arc<LogConfig>, target_system_id: u8) -> Self::Px4;

    /// Create the ArduPilot endpoint for the given target system
    fn ardupilot(&self, config: Arc<LogConfig>, target_system_id: u8) -> Self::ArduPilot;
}
