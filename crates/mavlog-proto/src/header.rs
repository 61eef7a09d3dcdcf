//! Frame header projection

use crate::error::{ProtoError, ProtoResult};
use crate::{frame_size, incompat_flag, stx};

/// MAVLink wire protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MavlinkVersion {
    V1,
    V2,
}

impl MavlinkVersion {
    /// Identify the version from a frame's start byte
    pub fn from_stx(byte: u8) -> Option<Self> {
        match byte {
            stx::V1 => Some(Self::V1),
            stx::V2 => Some(Self::V2),
            _ => None,
        }
    }

    /// Header length, start byte included
    pub fn header_len(self) -> usize {
        match self {
            Self::V1 => frame_size::HEADER_V1,
            Self::V2 => frame_size::HEADER_V2,
        }
    }
}

/// Borrowed view over the header of one framed MAVLink packet.
///
/// Construction only checks that the header itself is present. The payload
/// may be shorter than the length byte announces; `payload()` then returns
/// whatever is there.
#[derive(Debug, Clone, Copy)]
pub struct MavlinkHeader<'a> {
    buf: &'a [u8],
    version: MavlinkVersion,
}

impl<'a> MavlinkHeader<'a> {
    /// Decode the header at the start of `buf`
    pub fn parse(buf: &'a [u8]) -> ProtoResult<Self> {
        let magic = *buf.first().ok_or(ProtoError::Empty)?;
        let version = MavlinkVersion::from_stx(magic).ok_or(ProtoError::UnknownMagic(magic))?;

        let expected = version.header_len();
        if buf.len() < expected {
            return Err(ProtoError::Truncated {
                expected,
                actual: buf.len(),
            });
        }

        Ok(Self { buf, version })
    }

    pub fn version(&self) -> MavlinkVersion {
        self.version
    }

    /// Payload length announced by the header
    pub fn payload_len(&self) -> usize {
        self.buf[1] as usize
    }

    pub fn sequence(&self) -> u8 {
        match self.version {
            MavlinkVersion::V1 => self.buf[2],
            MavlinkVersion::V2 => self.buf[4],
        }
    }

    /// Source system id
    pub fn system_id(&self) -> u8 {
        match self.version {
            MavlinkVersion::V1 => self.buf[3],
            MavlinkVersion::V2 => self.buf[5],
        }
    }

    /// Source component id
    pub fn component_id(&self) -> u8 {
        match self.version {
            MavlinkVersion::V1 => self.buf[4],
            MavlinkVersion::V2 => self.buf[6],
        }
    }

    /// Message id (8 bits on v1, 24 bits little-endian on v2)
    pub fn msg_id(&self) -> u32 {
        match self.version {
            MavlinkVersion::V1 => self.buf[5] as u32,
            MavlinkVersion::V2 => u32::from_le_bytes([self.buf[7], self.buf[8], self.buf[9], 0]),
        }
    }

    /// v2 incompatibility flags; always zero on v1
    pub fn incompat_flags(&self) -> u8 {
        match self.version {
            MavlinkVersion::V1 => 0,
            MavlinkVersion::V2 => self.buf[2],
        }
    }

    /// Whether a signature block follows the checksum
    pub fn is_signed(&self) -> bool {
        self.incompat_flags() & incompat_flag::SIGNED != 0
    }

    /// Offset of the first payload byte within the frame
    pub fn payload_offset(&self) -> usize {
        self.version.header_len()
    }

    /// Payload bytes present in the buffer, at most `payload_len()` of them
    pub fn payload(&self) -> &'a [u8] {
        let start = self.payload_offset();
        let end = (start + self.payload_len()).min(self.buf.len());
        &self.buf[start..end]
    }

    /// Total frame length: header, payload, checksum and optional signature
    pub fn frame_len(&self) -> usize {
        let signature = if self.is_signed() {
            frame_size::SIGNATURE
        } else {
            0
        };
        self.payload_offset() + self.payload_len() + frame_size::CHECKSUM + signature
    }
}

/// Length of the frame starting at `buf[0]`, computed from its header
pub fn frame_len(buf: &[u8]) -> ProtoResult<usize> {
    MavlinkHeader::parse(buf).map(|header| header.frame_len())
}
