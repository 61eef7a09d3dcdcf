//! mavlog-flightlog - Flight-stack specific log endpoints
//!
//! One endpoint per supported flight stack. Both persist the forwarded
//! stream with a shared capture writer:
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐
//! │   Px4Log     │   │  ArduPilotLog  │
//! └──────┬───────┘   └───────┬────────┘
//!        └─────────┬─────────┘
//!           ┌──────┴────────┐
//!           │ CaptureWriter │  logs_dir/<date>-<stack>.tlog
//!           └───────────────┘
//! ```
//!
//! A capture record is an 8-byte big-endian microsecond UNIX timestamp
//! followed by the raw frame.

pub mod capture;
mod loggers;

pub use capture::{CaptureWriter, TIMESTAMP_LEN};
pub use loggers::{ArduPilotLog, FileLoggerFactory, FlightStack, Px4Log};
