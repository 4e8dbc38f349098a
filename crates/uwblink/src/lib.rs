//! # uwblink -- UWB positioning module driver
//!
//! `uwblink` is an asynchronous Rust driver for the RDDrone ultra-wideband
//! positioning module. The module is wired to a UART and, once commanded,
//! surveys a grid of fixed anchor beacons and then streams distance
//! measurements to each anchor, tens of times per second. The driver runs
//! the whole session -- survey, ranging, shutdown -- as a background task
//! and hands decoded measurement records to subscribers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use uwblink::{RddroneBuilder, UwbReport};
//!
//! #[tokio::main]
//! async fn main() -> uwblink::Result<()> {
//!     let (driver, mut reports) = RddroneBuilder::new("/dev/ttyS2")
//!         .baud_rate(115_200)
//!         .start()
//!         .await?;
//!
//!     while let Ok(report) = reports.recv().await {
//!         match report {
//!             UwbReport::GridSurvey(survey) => {
//!                 println!("grid surveyed: {} anchors", survey.anchor_count);
//!             }
//!             UwbReport::Distance(d) => {
//!                 println!("cycle {}: {:?} cm", d.counter, d.anchor_distances_cm);
//!             }
//!         }
//!     }
//!
//!     driver.request_stop();
//!     driver.wait().await
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                  | Purpose                                      |
//! |------------------------|----------------------------------------------|
//! | `uwblink-core`         | [`Transport`] trait, error type, report types |
//! | `uwblink-transport`    | Serial port transport                        |
//! | `uwblink-rddrone`      | Wire formats, framing, the session engine    |
//! | `uwblink-test-harness` | Scripted mock transport for tests            |
//! | **`uwblink`**          | This facade crate -- re-exports everything   |
//!
//! ## Session lifecycle
//!
//! A session moves through [`SessionState`] exactly once:
//!
//! 1. `AwaitingSurvey` -- the grid survey command is sent and re-sent until
//!    a survey response is accepted. There is no retry limit; a module
//!    that never answers keeps the session here until it is stopped.
//! 2. `SurveyAcquired` / `Ranging` -- the survey record is published, the
//!    ranging command is sent, and distance records stream until stopped.
//! 3. `Stopped` -- terminal. Entered via [`RddroneHandle::request_stop`]
//!    (or a fatal transport error); the stop-ranging command is sent to
//!    the module exactly once.
//!
//! Corrupt or truncated messages never end a session. They are counted
//! (see [`RddroneHandle::status`]) and the stream resynchronizes on the
//! next inter-message silence.

pub use uwblink_core::error::{Error, Result};
pub use uwblink_core::report::{DistanceReport, GridSurveyReport, ReportSink, UwbReport};
pub use uwblink_core::transport::Transport;
pub use uwblink_core::types::{GpsPosition, Position, MAX_ANCHORS};

pub use uwblink_rddrone::{
    FrameOutcome, FramerConfig, MessageFramer, RddroneBuilder, RddroneHandle, SessionState,
    SessionStats, SessionStatus,
};

pub use uwblink_transport::SerialTransport;

/// Wire-level constants and codecs for the module's messages.
pub mod wire {
    pub use uwblink_rddrone::wire::*;
}
