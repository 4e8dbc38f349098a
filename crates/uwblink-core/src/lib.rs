//! uwblink-core: Core traits, types, and error definitions for uwblink.
//!
//! This crate defines the device-agnostic abstractions the uwblink protocol
//! engines build on. Consumers of positioning telemetry depend on these
//! types without pulling in any specific module driver or transport.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level channel with per-read deadlines
//! - [`UwbReport`] / [`ReportSink`] -- decoded measurement records and
//!   where they go
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod report;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use uwblink_core::*`.
pub use error::{Error, Result};
pub use report::{DistanceReport, GridSurveyReport, ReportSink, UwbReport};
pub use transport::Transport;
pub use types::{GpsPosition, Position, MAX_ANCHORS};
