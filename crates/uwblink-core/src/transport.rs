//! Transport trait for UWB module communication.
//!
//! The [`Transport`] trait abstracts over the serial link to a positioning
//! module. Implementations exist for real serial ports
//! (`uwblink-transport`) and for scripted mock ports
//! (`uwblink-test-harness`).
//!
//! The protocol engine operates on a `Transport` rather than directly on a
//! serial port, enabling both real hardware and deterministic unit testing.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level channel to a UWB module, with per-read deadlines.
///
/// Framing is timing-driven on this link, so the receive side is deliberately
/// low-level: one bounded wait per call, no internal buffering, no
/// reordering. Everything above raw bytes (message boundaries, layouts,
/// session state) belongs to the protocol engine.
#[async_trait]
pub trait Transport: Send {
    /// Write a command frame to the module.
    ///
    /// Returns the number of bytes actually written. A short write is not
    /// an error at this layer -- the caller decides whether to log or
    /// retry. Commands on this link are effectively idempotent, so the
    /// protocol engine logs short writes and moves on.
    async fn send(&mut self, data: &[u8]) -> Result<usize>;

    /// Read whatever bytes are available, waiting at most `timeout`.
    ///
    /// Returns the number of bytes placed in `buf`. `Ok(0)` means "no data
    /// this cycle" and is *not* end-of-stream; the caller simply waits
    /// again. When the deadline elapses with nothing at all,
    /// [`Error::Timeout`](crate::error::Error::Timeout) is returned -- that
    /// is the boundary signal the framer keys on.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport.
    ///
    /// After `close()`, subsequent `send()` and `receive()` calls return
    /// [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
