//! mavlog-autolog - Autopilot-detecting flight log gate
//!
//! `AutoLog` sits on one vehicle connection's packet stream, picks the
//! first autopilot that sends a heartbeat, works out its flight stack and
//! binds the matching logger. From then on every packet goes straight to
//! that logger.
//!
//! # States
//!
//! ```text
//!  ┌────────────┐  autopilot heartbeat  ┌──────────────┐  PX4 / ArduPilot  ┌───────┐
//!  │ Untargeted ├──────────────────────►│   Targeted   ├──────────────────►│ Bound │
//!  └────────────┘                       └──────┬───────┘                   └───────┘
//!                                              │ ▲ unknown autopilot
//!                                              └─┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mavlog_autolog::AutoLog;
//! use mavlog_core::{LogConfig, LogEndpoint};
//!
//! let mut gate = AutoLog::new(Arc::new(LogConfig::default()));
//! for packet in frames {
//!     gate.write_msg(packet)?;
//! }
//! gate.stop();
//! gate.report_statistics();
//! ```

mod gate;

pub use gate::{AutoLog, FlightStackLogger, GateState};

// Re-export for convenience
pub use mavlog_core::{EndpointResult, LogConfig, LogEndpoint, LoggerFactory};
pub use mavlog_flightlog::{FileLoggerFactory, FlightStack};
