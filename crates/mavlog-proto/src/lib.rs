//! mavlog-proto - MAVLink framing helpers for flight log routing
//!
//! Only the parts of MAVLink needed to classify a stream are implemented:
//! the v1 and v2 frame headers and the HEARTBEAT payload. Everything is a
//! borrowed view over the caller's buffer; nothing allocates.
//!
//! # Frame layouts
//!
//! ```text
//! v1:  STX(0xFE) LEN SEQ SYS COMP MSGID                         | payload | CRC(2)
//! v2:  STX(0xFD) LEN INCOMPAT COMPAT SEQ SYS COMP MSGID(3, LE)  | payload | CRC(2) [SIG(13)]
//! ```

mod autopilot;
mod error;
mod header;
mod heartbeat;
pub mod testing;

pub use autopilot::Autopilot;
pub use error::{ProtoError, ProtoResult};
pub use header::{frame_len, MavlinkHeader, MavlinkVersion};
pub use heartbeat::{Heartbeat, HEARTBEAT_LEN};

/// Start-of-frame markers
pub mod stx {
    /// MAVLink 1 start byte
    pub const V1: u8 = 0xFE;
    /// MAVLink 2 start byte
    pub const V2: u8 = 0xFD;
}

/// Fixed sizes of frame sections
pub mod frame_size {
    /// MAVLink 1 header, including the start byte
    pub const HEADER_V1: usize = 6;
    /// MAVLink 2 header, including the start byte
    pub const HEADER_V2: usize = 10;
    /// Trailing CRC-16
    pub const CHECKSUM: usize = 2;
    /// Optional MAVLink 2 signature block
    pub const SIGNATURE: usize = 13;
}

/// MAVLink 2 incompatibility flags
pub mod incompat_flag {
    /// Frame carries a signature block
    pub const SIGNED: u8 = 0x01;
}

/// Message ids used by the router
pub mod msg_id {
    pub const HEARTBEAT: u32 = 0;
}

/// Well-known component ids (MAV_COMPONENT)
pub mod component_id {
    /// Primary flight controller of a system
    pub const AUTOPILOT1: u8 = 1;
}

/// MAV_MODE_FLAG bits of `HEARTBEAT.base_mode`
pub mod mode_flag {
    /// Motors are armed
    pub const SAFETY_ARMED: u8 = 0x80;
}
