//! HEARTBEAT payload view

use crate::autopilot::Autopilot;
use crate::header::MavlinkHeader;
use crate::{mode_flag, msg_id};

/// Field offsets of the HEARTBEAT payload (wire order, largest field first)
mod offset {
    pub const CUSTOM_MODE: usize = 0;
    pub const TYPE: usize = 4;
    pub const AUTOPILOT: usize = 5;
    pub const BASE_MODE: usize = 6;
    pub const SYSTEM_STATUS: usize = 7;
    pub const MAVLINK_VERSION: usize = 8;
}

/// Full HEARTBEAT payload length
pub const HEARTBEAT_LEN: usize = 9;

/// Borrowed view over a HEARTBEAT payload.
///
/// MAVLink 2 drops trailing zero bytes from payloads on the wire, so any
/// field beyond the end of the buffer reads as zero.
#[derive(Debug, Clone, Copy)]
pub struct Heartbeat<'a> {
    payload: &'a [u8],
}

impl<'a> Heartbeat<'a> {
    /// Wrap a raw HEARTBEAT payload
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    /// View the payload of `header` if it carries a HEARTBEAT
    pub fn from_header(header: &MavlinkHeader<'a>) -> Option<Self> {
        (header.msg_id() == msg_id::HEARTBEAT).then(|| Self::new(header.payload()))
    }

    fn byte(&self, index: usize) -> u8 {
        self.payload.get(index).copied().unwrap_or(0)
    }

    pub fn custom_mode(&self) -> u32 {
        let at = offset::CUSTOM_MODE;
        u32::from_le_bytes([
            self.byte(at),
            self.byte(at + 1),
            self.byte(at + 2),
            self.byte(at + 3),
        ])
    }

    /// MAV_TYPE of the sender
    pub fn mav_type(&self) -> u8 {
        self.byte(offset::TYPE)
    }

    /// Raw MAV_AUTOPILOT value
    pub fn autopilot_raw(&self) -> u8 {
        self.byte(offset::AUTOPILOT)
    }

    pub fn autopilot(&self) -> Autopilot {
        Autopilot::from(self.autopilot_raw())
    }

    pub fn base_mode(&self) -> u8 {
        self.byte(offset::BASE_MODE)
    }

    pub fn system_status(&self) -> u8 {
        self.byte(offset::SYSTEM_STATUS)
    }

    pub fn mavlink_version(&self) -> u8 {
        self.byte(offset::MAVLINK_VERSION)
    }

    /// Whether `base_mode` reports the vehicle as armed
    pub fn is_armed(&self) -> bool {
        self.base_mode() & mode_flag::SAFETY_ARMED != 0
    }
}
