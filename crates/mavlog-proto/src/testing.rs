//! Frame construction helpers for tests and capture tooling
//!
//! Frames are emitted with a zeroed checksum (and zeroed signature when
//! signed): nothing in this workspace validates either.

use crate::header::MavlinkVersion;
use crate::heartbeat::HEARTBEAT_LEN;
use crate::{frame_size, incompat_flag, msg_id, stx};

/// MAV_TYPE_QUADROTOR, used as the default vehicle type in heartbeats
const MAV_TYPE_QUADROTOR: u8 = 2;
/// MAV_STATE_ACTIVE
const MAV_STATE_ACTIVE: u8 = 4;
/// Protocol version byte carried in every heartbeat
const HEARTBEAT_MAVLINK_VERSION: u8 = 3;

/// Builder for a single framed MAVLink packet
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    version: MavlinkVersion,
    msg_id: u32,
    system_id: u8,
    component_id: u8,
    sequence: u8,
    payload: Vec<u8>,
    signed: bool,
}

impl FrameBuilder {
    /// Start a frame; v1 frames keep only the low byte of `msg_id`
    pub fn new(version: MavlinkVersion, msg_id: u32) -> Self {
        Self {
            version,
            msg_id,
            system_id: 1,
            component_id: 1,
            sequence: 0,
            payload: Vec::new(),
            signed: false,
        }
    }

    pub fn system(mut self, system_id: u8) -> Self {
        self.system_id = system_id;
        self
    }

    pub fn component(mut self, component_id: u8) -> Self {
        self.component_id = component_id;
        self
    }

    pub fn sequence(mut self, sequence: u8) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    /// Mark a v2 frame as signed (ignored for v1)
    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    /// Serialize the frame.
    ///
    /// v2 payloads are truncated the way senders do on the wire: trailing
    /// zero bytes are dropped, keeping at least one byte.
    pub fn build(&self) -> Vec<u8> {
        match self.version {
            MavlinkVersion::V1 => self.build_v1(),
            MavlinkVersion::V2 => self.build_v2(),
        }
    }

    fn build_v1(&self) -> Vec<u8> {
        let mut frame =
            Vec::with_capacity(frame_size::HEADER_V1 + self.payload.len() + frame_size::CHECKSUM);
        frame.extend_from_slice(&[
            stx::V1,
            self.payload.len() as u8,
            self.sequence,
            self.system_id,
            self.component_id,
            self.msg_id as u8,
        ]);
        frame.extend_from_slice(&self.payload);
        frame.extend_from_slice(&[0; frame_size::CHECKSUM]);
        frame
    }

    fn build_v2(&self) -> Vec<u8> {
        let used = self
            .payload
            .iter()
            .rposition(|&b| b != 0)
            .map_or(1, |last| last + 1)
            .min(self.payload.len());
        let payload = &self.payload[..used];

        let incompat = if self.signed {
            incompat_flag::SIGNED
        } else {
            0
        };
        let id = self.msg_id.to_le_bytes();

        let mut frame = Vec::with_capacity(
            frame_size::HEADER_V2 + payload.len() + frame_size::CHECKSUM + frame_size::SIGNATURE,
        );
        frame.extend_from_slice(&[
            stx::V2,
            payload.len() as u8,
            incompat,
            0,
            self.sequence,
            self.system_id,
            self.component_id,
            id[0],
            id[1],
            id[2],
        ]);
        frame.extend_from_slice(payload);
        frame.extend_from_slice(&[0; frame_size::CHECKSUM]);
        if self.signed {
            frame.extend_from_slice(&[0; frame_size::SIGNATURE]);
        }
        frame
    }
}

/// HEARTBEAT payload for a quadrotor with the given autopilot and base mode
pub fn heartbeat_payload(autopilot: u8, base_mode: u8) -> [u8; HEARTBEAT_LEN] {
    [
        0,
        0,
        0,
        0,
        MAV_TYPE_QUADROTOR,
        autopilot,
        base_mode,
        MAV_STATE_ACTIVE,
        HEARTBEAT_MAVLINK_VERSION,
    ]
}

/// Framed, disarmed HEARTBEAT
pub fn heartbeat(version: MavlinkVersion, system_id: u8, component_id: u8, autopilot: u8) -> Vec<u8> {
    heartbeat_with_mode(version, system_id, component_id, autopilot, 0)
}

/// Framed HEARTBEAT with an explicit `base_mode`
pub fn heartbeat_with_mode(
    version: MavlinkVersion,
    system_id: u8,
    component_id: u8,
    autopilot: u8,
    base_mode: u8,
) -> Vec<u8> {
    FrameBuilder::new(version, msg_id::HEARTBEAT)
        .system(system_id)
        .component(component_id)
        .payload(&heartbeat_payload(autopilot, base_mode))
        .build()
}
