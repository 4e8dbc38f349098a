//! Driver for the RDDrone UWB positioning module.
//!
//! The module sits on a UART and, once commanded, surveys a grid of fixed
//! anchors and then streams distance measurements to each of them. This
//! crate owns everything protocol-shaped:
//!
//! - [`wire`]: the fixed binary message layouts and outbound command
//!   frames;
//! - [`framer`]: timing-based message boundary detection (the link has no
//!   delimiters);
//! - [`session`]: the survey-then-range state machine, run as a spawned
//!   task;
//! - [`builder`]: the way in.
//!
//! ```no_run
//! use uwblink_rddrone::RddroneBuilder;
//!
//! # async fn example() -> uwblink_core::Result<()> {
//! let (driver, mut reports) = RddroneBuilder::new("/dev/ttyS2").start().await?;
//! let first = reports.recv().await;
//! driver.request_stop();
//! driver.wait().await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod framer;
pub mod session;
pub mod wire;

pub use builder::RddroneBuilder;
pub use framer::{FrameOutcome, FramerConfig, MessageFramer};
pub use session::{RddroneHandle, SessionState, SessionStats, SessionStatus};
