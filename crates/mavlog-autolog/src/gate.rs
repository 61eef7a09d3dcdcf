//! AutoLog gate - detects the flight stack and binds the matching logger

use std::sync::Arc;

use mavlog_core::{
    EndpointResult, EndpointStatistics, EndpointStats, LogConfig, LogEndpoint, LoggerFactory,
};
use mavlog_flightlog::{FileLoggerFactory, FlightStack};
use mavlog_proto::{component_id, frame_size, msg_id, Heartbeat, MavlinkHeader};
use tracing::{debug, info, trace, warn};

const ENDPOINT_NAME: &str = "autolog";

/// The logger a gate is bound to
pub enum FlightStackLogger<P, A> {
    Px4(P),
    ArduPilot(A),
}

impl<P: LogEndpoint, A: LogEndpoint> FlightStackLogger<P, A> {
    pub fn flight_stack(&self) -> FlightStack {
        match self {
            Self::Px4(_) => FlightStack::Px4,
            Self::ArduPilot(_) => FlightStack::ArduPilot,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Px4(logger) => logger.name(),
            Self::ArduPilot(logger) => logger.name(),
        }
    }

    fn write_msg(&mut self, packet: &[u8]) -> EndpointResult<usize> {
        match self {
            Self::Px4(logger) => logger.write_msg(packet),
            Self::ArduPilot(logger) => logger.write_msg(packet),
        }
    }

    fn stop(&mut self) {
        match self {
            Self::Px4(logger) => logger.stop(),
            Self::ArduPilot(logger) => logger.stop(),
        }
    }

    fn report_statistics(&self) -> EndpointStatistics {
        match self {
            Self::Px4(logger) => logger.report_statistics(),
            Self::ArduPilot(logger) => logger.report_statistics(),
        }
    }
}

/// Detection progress of a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No autopilot heartbeat seen yet
    Untargeted,
    /// Target system known, flight stack not yet recognized
    Targeted { system_id: u8 },
    /// Logger bound; terminal
    Bound { system_id: u8, stack: FlightStack },
}

/// Log endpoint that defers the choice of flight-stack logger until the
/// stream's autopilot has identified itself.
///
/// - The first HEARTBEAT from a primary autopilot component fixes the
///   target system for the gate's lifetime.
/// - Heartbeats from the target are classified by their `autopilot` field.
///   PX4 and ArduPilot bind the matching logger; anything else is retried
///   on the next heartbeat.
/// - Once bound, packets are forwarded untouched and the logger's result
///   is returned as is. The classifying heartbeat itself is not forwarded.
///
/// Every packet seen while unbound is reported as fully consumed.
pub struct AutoLog<F: LoggerFactory = FileLoggerFactory> {
    config: Arc<LogConfig>,
    factory: F,
    target_system_id: Option<u8>,
    logger: Option<FlightStackLogger<F::Px4, F::ArduPilot>>,
    base: EndpointStats,
}

impl AutoLog<FileLoggerFactory> {
    /// Create a gate that binds the file-backed loggers
    pub fn new(config: Arc<LogConfig>) -> Self {
        Self::with_factory(config, FileLoggerFactory)
    }
}

impl<F: LoggerFactory> AutoLog<F> {
    /// Create a gate over `factory`. A configured `fcu_id` becomes the
    /// preset target.
    pub fn with_factory(config: Arc<LogConfig>, factory: F) -> Self {
        Self {
            target_system_id: config.fcu_id,
            config,
            factory,
            logger: None,
            base: EndpointStats::new(ENDPOINT_NAME),
        }
    }

    /// Fix the target system up front instead of waiting for the first
    /// autopilot heartbeat. Has no effect once a target is known.
    pub fn with_target_system(mut self, system_id: u8) -> Self {
        match self.target_system_id {
            None => self.target_system_id = Some(system_id),
            Some(current) => warn!(
                current,
                requested = system_id,
                "Target system already selected, ignoring preset"
            ),
        }
        self
    }

    /// Handle one framed packet, returning the number of bytes consumed
    pub fn submit(&mut self, packet: &[u8]) -> EndpointResult<usize> {
        if let Some(logger) = self.logger.as_mut() {
            return logger.write_msg(packet);
        }

        // Nothing is persisted until a logger is bound
        self.base.record_received(packet.len());
        self.base.record_dropped();

        let header = match MavlinkHeader::parse(packet) {
            Ok(header) => header,
            Err(e) => {
                trace!(
                    error = %e,
                    head = %hex::encode(&packet[..packet.len().min(frame_size::HEADER_V2)]),
                    "Passing through undecodable packet"
                );
                return Ok(packet.len());
            }
        };

        let is_heartbeat = header.msg_id() == msg_id::HEARTBEAT;
        let system_id = header.system_id();

        if self.target_system_id.is_none()
            && is_heartbeat
            && header.component_id() == component_id::AUTOPILOT1
        {
            info!(system_id, "Selected target system from autopilot heartbeat");
            self.target_system_id = Some(system_id);
        }

        if !is_heartbeat || self.target_system_id != Some(system_id) {
            return Ok(packet.len());
        }

        let heartbeat = Heartbeat::new(header.payload());
        debug!(
            system_id,
            autopilot = heartbeat.autopilot_raw(),
            "Got autopilot from heartbeat"
        );

        match FlightStack::from_autopilot(heartbeat.autopilot()) {
            Some(stack) => self.bind(stack, system_id),
            None => warn!(
                system_id,
                autopilot = %heartbeat.autopilot(),
                "Unidentified autopilot, cannot start flight stack logging"
            ),
        }

        Ok(packet.len())
    }

    fn bind(&mut self, stack: FlightStack, system_id: u8) {
        let config = Arc::clone(&self.config);
        let logger = match stack {
            FlightStack::Px4 => FlightStackLogger::Px4(self.factory.px4(config, system_id)),
            FlightStack::ArduPilot => {
                FlightStackLogger::ArduPilot(self.factory.ardupilot(config, system_id))
            }
        };
        info!(
            system_id,
            flight_stack = %stack,
            logger = logger.name(),
            "Flight stack detected, logger bound"
        );
        self.logger = Some(logger);
    }

    pub fn state(&self) -> GateState {
        match (&self.logger, self.target_system_id) {
            (Some(logger), Some(system_id)) => GateState::Bound {
                system_id,
                stack: logger.flight_stack(),
            },
            (_, Some(system_id)) => GateState::Targeted { system_id },
            (_, None) => GateState::Untargeted,
        }
    }

    pub fn target_system_id(&self) -> Option<u8> {
        self.target_system_id
    }

    pub fn is_bound(&self) -> bool {
        self.logger.is_some()
    }

    pub fn logger(&self) -> Option<&FlightStackLogger<F::Px4, F::ArduPilot>> {
        self.logger.as_ref()
    }

    pub fn config(&self) -> &Arc<LogConfig> {
        &self.config
    }

    /// Base statistics reported while no logger is bound
    pub fn base_stats_mut(&mut self) -> &mut EndpointStats {
        &mut self.base
    }
}

impl<F: LoggerFactory + Send> LogEndpoint for AutoLog<F> {
    fn name(&self) -> &str {
        ENDPOINT_NAME
    }

    /// Nothing to acquire: the logger is created on classification
    fn start(&mut self) -> EndpointResult<()> {
        Ok(())
    }

    fn write_msg(&mut self, packet: &[u8]) -> EndpointResult<usize> {
        self.submit(packet)
    }

    fn stop(&mut self) {
        if let Some(logger) = self.logger.as_mut() {
            logger.stop();
        }
    }

    fn report_statistics(&self) -> EndpointStatistics {
        match &self.logger {
            Some(logger) => logger.report_statistics(),
            None => self.base.report(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mavlog_core::mock::RecordingFactory;
    use mavlog_proto::testing::{heartbeat, FrameBuilder};
    use mavlog_proto::MavlinkVersion;

    const PX4: u8 = 12;
    const ARDUPILOT: u8 = 3;

    fn gate() -> (AutoLog<RecordingFactory>, RecordingFactory) {
        let factory = RecordingFactory::new();
        let gate = AutoLog::with_factory(Arc::new(LogConfig::default()), factory.clone());
        (gate, factory)
    }

    #[test]
    fn test_initial_state() {
        let (gate, _) = gate();
        assert_eq!(gate.state(), GateState::Untargeted);
        assert_eq!(gate.target_system_id(), None);
        assert!(!gate.is_bound());
        assert!(gate.logger().is_none());
    }

    #[test]
    fn test_start_always_succeeds() {
        let (mut gate, factory) = gate();
        assert!(gate.start().is_ok());
        assert_eq!(factory.px4.lock().created, 0);
        assert_eq!(factory.ardupilot.lock().created, 0);
    }

    #[test]
    fn test_px4_heartbeat_binds_px4() {
        let (mut gate, factory) = gate();
        let hb = heartbeat(MavlinkVersion::V2, 1, 1, PX4);

        assert_eq!(gate.submit(&hb).unwrap(), hb.len());
        assert_eq!(
            gate.state(),
            GateState::Bound {
                system_id: 1,
                stack: FlightStack::Px4
            }
        );
        assert_eq!(gate.logger().unwrap().name(), "px4-recorder");

        let px4 = factory.px4.lock();
        assert_eq!(px4.created, 1);
        assert_eq!(px4.target_system_id, Some(1));
        assert!(px4.packets.is_empty(), "binding heartbeat must not be forwarded");
        assert_eq!(factory.ardupilot.lock().created, 0);
    }

    #[test]
    fn test_config_passed_through_unchanged() {
        let (mut gate, factory) = gate();
        gate.submit(&heartbeat(MavlinkVersion::V1, 1, 1, ARDUPILOT))
            .unwrap();

        let rec = factory.ardupilot.lock();
        assert!(Arc::ptr_eq(rec.config.as_ref().unwrap(), gate.config()));
    }

    #[test]
    fn test_preset_target_filters_other_systems() {
        let (gate, factory) = gate();
        let mut gate = gate.with_target_system(9);
        assert_eq!(gate.state(), GateState::Targeted { system_id: 9 });

        gate.submit(&heartbeat(MavlinkVersion::V2, 1, 1, PX4)).unwrap();
        assert_eq!(gate.target_system_id(), Some(9));
        assert!(!gate.is_bound());

        gate.submit(&heartbeat(MavlinkVersion::V2, 9, 1, PX4)).unwrap();
        assert!(gate.is_bound());
        assert_eq!(factory.px4.lock().target_system_id, Some(9));
    }

    #[test]
    fn test_configured_fcu_id_presets_target() {
        let config = LogConfig {
            fcu_id: Some(6),
            ..Default::default()
        };
        let gate = AutoLog::with_factory(Arc::new(config), RecordingFactory::new());
        assert_eq!(gate.state(), GateState::Targeted { system_id: 6 });
    }

    #[test]
    fn test_preset_does_not_override_target() {
        let (mut gate, _) = gate();
        gate.submit(&heartbeat(MavlinkVersion::V2, 4, 1, 0)).unwrap();
        let gate = gate.with_target_system(5);
        assert_eq!(gate.target_system_id(), Some(4));
    }

    #[test]
    fn test_undecodable_packets_pass_through() {
        let (mut gate, _) = gate();
        assert_eq!(gate.submit(&[]).unwrap(), 0);
        assert_eq!(gate.submit(&[0x55, 1, 2, 3]).unwrap(), 4);
        assert_eq!(gate.submit(&[0xFD, 9, 0]).unwrap(), 3);
        assert_eq!(gate.state(), GateState::Untargeted);
    }

    #[test]
    fn test_truncated_heartbeat_reads_generic_autopilot() {
        let (mut gate, _) = gate();
        // v2 heartbeat cut after `type`: autopilot reads as GENERIC
        let hb = FrameBuilder::new(MavlinkVersion::V2, msg_id::HEARTBEAT)
            .system(2)
            .payload(&[0, 0, 0, 0, 2])
            .build();
        gate.submit(&hb).unwrap();
        assert_eq!(gate.state(), GateState::Targeted { system_id: 2 });
    }

    #[test]
    fn test_stop_without_logger_is_noop() {
        let (mut gate, factory) = gate();
        gate.stop();
        gate.stop();
        assert_eq!(factory.px4.lock().stops, 0);
        assert_eq!(factory.ardupilot.lock().stops, 0);
    }

    #[test]
    fn test_stop_propagates_to_logger() {
        let (mut gate, factory) = gate();
        gate.submit(&heartbeat(MavlinkVersion::V2, 1, 1, ARDUPILOT))
            .unwrap();
        gate.stop();
        assert_eq!(factory.ardupilot.lock().stops, 1);
    }

    #[test]
    fn test_statistics_fall_back_to_base() {
        let (mut gate, factory) = gate();
        gate.base_stats_mut().record_received(17);

        let stats = gate.report_statistics();
        assert_eq!(stats.endpoint, "autolog");
        assert_eq!(stats.received.packets, 1);
        assert_eq!(factory.px4.lock().reports, 0);
    }

    #[test]
    fn test_unbound_traffic_counted_on_base() {
        let (mut gate, factory) = gate();
        let attitude = FrameBuilder::new(MavlinkVersion::V2, 30)
            .system(5)
            .payload(&[7; 28])
            .build();
        for _ in 0..3 {
            gate.submit(&attitude).unwrap();
        }
        gate.submit(&[0x55, 1]).unwrap();
        // The binding heartbeat is consumed by the gate as well
        let binding = heartbeat(MavlinkVersion::V2, 1, 1, PX4);
        gate.submit(&binding).unwrap();

        let stats = gate.base_stats_mut().snapshot();
        assert_eq!(stats.received.packets, 5);
        assert_eq!(
            stats.received.bytes,
            (3 * attitude.len() + 2 + binding.len()) as u64
        );
        assert_eq!(stats.dropped, 5);
        assert_eq!(stats.written.packets, 0);

        // Once bound, traffic belongs to the logger
        gate.submit(&attitude).unwrap();
        assert_eq!(gate.base_stats_mut().snapshot().received.packets, 5);
        assert_eq!(factory.px4.lock().packets, vec![attitude]);
    }

    #[test]
    fn test_statistics_delegate_when_bound() {
        let (mut gate, factory) = gate();
        gate.submit(&heartbeat(MavlinkVersion::V2, 1, 1, PX4)).unwrap();

        let stats = gate.report_statistics();
        assert_eq!(stats.endpoint, "px4-recorder");
        assert_eq!(factory.px4.lock().reports, 1);
    }
}
