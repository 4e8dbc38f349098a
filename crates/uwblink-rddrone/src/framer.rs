//! Timing-based message framer.
//!
//! The module emits its fixed-size messages back-to-back with no preamble,
//! delimiter, or length prefix. The only reliable boundary signal is the
//! pause between transmissions, so the framer accumulates bytes under two
//! deadlines:
//!
//! - a *cold-start* deadline while waiting for the first byte of a new
//!   message, and
//! - a much shorter *inter-byte* deadline between consecutive bytes of the
//!   same message.
//!
//! A gap longer than the inter-byte deadline mid-message means the attempt
//! is broken (driver started mid-message, or a byte was dropped); the
//! partial buffer is discarded and the next attempt starts from byte zero.
//! There is no resynchronization state to keep -- the silence before the
//! next message realigns the stream for free.
//!
//! The inter-byte threshold is a tuned property of the hardware: it must
//! stay below the idle time the module guarantees between messages
//! (otherwise consecutive messages merge) and above the worst intra-message
//! byte gap (otherwise messages are truncated). It is carried as named
//! configuration, not a literal.

use std::time::Duration;

use uwblink_core::error::{Error, Result};
use uwblink_core::transport::Transport;

/// Default gap that ends a framing attempt: 5 ms, found experimentally to
/// never cut a message short while staying well under the ~37 ms message
/// cadence of the module.
pub const DEFAULT_INTER_BYTE_TIMEOUT: Duration = Duration::from_millis(5);

/// Default cold-start deadline. Advisory: its expiry is reported, not
/// acted on.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Framing deadlines.
#[derive(Debug, Clone, Copy)]
pub struct FramerConfig {
    /// How long to wait for the first byte of a new message.
    pub startup_timeout: Duration,
    /// Maximum idle time between consecutive bytes of one message.
    pub inter_byte_timeout: Duration,
}

impl Default for FramerConfig {
    fn default() -> Self {
        FramerConfig {
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            inter_byte_timeout: DEFAULT_INTER_BYTE_TIMEOUT,
        }
    }
}

/// The result of one framing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The buffer filled to exactly the expected size.
    Complete(Vec<u8>),
    /// No byte at all arrived within the cold-start deadline.
    TimedOut,
    /// Bytes arrived but a gap interrupted the message; the partial buffer
    /// was discarded.
    Aborted,
}

/// Accumulates one fixed-size message per call, using inter-byte timing as
/// the only boundary signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFramer {
    config: FramerConfig,
}

impl MessageFramer {
    pub fn new(config: FramerConfig) -> Self {
        MessageFramer { config }
    }

    /// Run one framing attempt, reading until the buffer holds exactly
    /// `expected_size` bytes or a deadline ends the attempt.
    ///
    /// Each cycle reads as many bytes as the transport currently has, into
    /// the remaining capacity only -- a message can never over-read into
    /// the next one. A zero-byte read is "no data this cycle" and simply
    /// waits again; only [`Error::Timeout`] from the transport ends an
    /// attempt. Transport errors other than the deadline propagate.
    pub async fn receive_message(
        &self,
        transport: &mut dyn Transport,
        expected_size: usize,
    ) -> Result<FrameOutcome> {
        let mut frame = vec![0u8; expected_size];
        let mut cursor = 0usize;

        loop {
            let timeout = if cursor == 0 {
                self.config.startup_timeout
            } else {
                self.config.inter_byte_timeout
            };

            match transport.receive(&mut frame[cursor..], timeout).await {
                Ok(0) => continue,
                Ok(n) => {
                    cursor += n;
                    if cursor == expected_size {
                        return Ok(FrameOutcome::Complete(frame));
                    }
                }
                Err(Error::Timeout) => {
                    return if cursor == 0 {
                        Ok(FrameOutcome::TimedOut)
                    } else {
                        tracing::trace!(
                            received = cursor,
                            expected = expected_size,
                            "inter-byte gap, discarding partial message"
                        );
                        Ok(FrameOutcome::Aborted)
                    };
                }
                Err(e) => return Err(e),
            }
        }
    }
}
