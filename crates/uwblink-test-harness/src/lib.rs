//! Test harness for uwblink protocol engines.
//!
//! Provides [`MockPort`], a scripted [`Transport`](uwblink_core::Transport)
//! with virtual inter-byte timing, so framing and session logic can be
//! tested deterministically without hardware and without real sleeps.

pub mod mock_port;

pub use mock_port::{MockPort, MockPortHandle};
