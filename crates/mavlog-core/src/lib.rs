//! mavlog-core - Core traits and types for flight log endpoints
//!
//! This crate provides the abstractions shared by the autopilot-detecting
//! log gate and the concrete flight-stack loggers it can bind to.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod mock;
pub mod stats;

pub use config::{ConfigError, ConfigResult, LogConfig, LogMode};
pub use endpoint::{LogEndpoint, LoggerFactory};
pub use error::{EndpointError, EndpointResult};
pub use stats::{EndpointStatistics, EndpointStats, TrafficCounters};
