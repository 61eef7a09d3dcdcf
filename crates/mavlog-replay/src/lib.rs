//! mavlog-replay - feed recorded telemetry through a log endpoint
//!
//! Captures use the `.tlog` layout the flight-stack loggers write: each
//! record is an 8-byte big-endian microsecond timestamp followed by one
//! MAVLink frame, whose length is taken from its own header.

use mavlog_core::LogEndpoint;
use mavlog_flightlog::TIMESTAMP_LEN;
use mavlog_proto::{frame_len, ProtoError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while walking a capture
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// Record cut short at the end of the capture
    #[error("truncated record at offset {offset}: need {needed} bytes, {available} left")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Frame header could not be decoded
    #[error("bad frame at offset {offset}: {source}")]
    Frame {
        offset: usize,
        #[source]
        source: ProtoError,
    },
}

/// One record of a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRecord<'a> {
    /// Microseconds since the UNIX epoch
    pub timestamp_us: u64,
    pub frame: &'a [u8],
}

/// Iterator over the records of an in-memory capture.
///
/// Stops after the first error: without a valid header there is no way to
/// find the next record boundary.
pub struct CaptureReader<'a> {
    data: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> CaptureReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            failed: false,
        }
    }

    /// Byte offset of the next record
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn truncated(&self, needed: usize, available: usize) -> CaptureError {
        CaptureError::Truncated {
            offset: self.offset,
            needed,
            available,
        }
    }

    fn read_record(&mut self) -> Result<CaptureRecord<'a>, CaptureError> {
        let rest = &self.data[self.offset..];
        if rest.len() < TIMESTAMP_LEN {
            return Err(self.truncated(TIMESTAMP_LEN, rest.len()));
        }

        let (stamp, body) = rest.split_at(TIMESTAMP_LEN);
        let mut ts = [0u8; TIMESTAMP_LEN];
        ts.copy_from_slice(stamp);

        let len = frame_len(body).map_err(|source| CaptureError::Frame {
            offset: self.offset + TIMESTAMP_LEN,
            source,
        })?;
        if body.len() < len {
            return Err(self.truncated(TIMESTAMP_LEN + len, rest.len()));
        }

        self.offset += TIMESTAMP_LEN + len;
        Ok(CaptureRecord {
            timestamp_us: u64::from_be_bytes(ts),
            frame: &body[..len],
        })
    }
}

impl<'a> Iterator for CaptureReader<'a> {
    type Item = Result<CaptureRecord<'a>, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }
        let record = self.read_record();
        self.failed = record.is_err();
        Some(record)
    }
}

/// Outcome of a replay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Frames handed to the endpoint
    pub frames: u64,
    /// Bytes the endpoint reported as consumed
    pub consumed_bytes: u64,
    /// Frames the endpoint rejected
    pub write_errors: u64,
    /// Capture error that ended the replay early, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_error: Option<String>,
}

/// Feed every record of `data` to `endpoint`, in capture order.
///
/// Write errors are counted and the replay continues, unless the endpoint
/// reports that it can no longer accept packets.
pub fn replay<E: LogEndpoint + ?Sized>(endpoint: &mut E, data: &[u8]) -> ReplaySummary {
    let mut summary = ReplaySummary::default();

    for record in CaptureReader::new(data) {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Capture ended early");
                summary.capture_error = Some(e.to_string());
                break;
            }
        };

        summary.frames += 1;
        match endpoint.write_msg(record.frame) {
            Ok(consumed) => summary.consumed_bytes += consumed as u64,
            Err(e) => {
                summary.write_errors += 1;
                warn!(
                    endpoint = endpoint.name(),
                    timestamp_us = record.timestamp_us,
                    error = %e,
                    "Endpoint rejected frame"
                );
                if e.is_fatal() {
                    break;
                }
            }
        }
    }

    debug!(frames = summary.frames, "Replay finished");
    summary
}
