//! Scripted mock transport with virtual inter-byte timing.
//!
//! Framing on the UWB link is timing-driven, so a request/response mock is
//! not enough: tests need to express *when* bytes arrive relative to the
//! reader's deadlines. [`MockPort`] models that with a script of byte
//! chunks and gaps. A gap consumes the caller's receive deadline virtually
//! -- no real sleeping -- which keeps tests deterministic and fast:
//!
//! - a gap shorter than the remaining deadline elapses and the next chunk
//!   is delivered within the same `receive()` call;
//! - a gap longer than the deadline shrinks by the deadline and the call
//!   returns `Timeout`, exactly as a quiet wire would.
//!
//! # Example
//!
//! ```
//! use uwblink_test_harness::MockPort;
//! use std::time::Duration;
//!
//! let (port, handle) = MockPort::new();
//! handle.push_bytes(&[0x01, 0x02, 0x03]);
//! handle.push_gap(Duration::from_millis(50)); // inter-message silence
//! handle.push_bytes(&[0x04]);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use uwblink_core::error::{Error, Result};
use uwblink_core::transport::Transport;

/// One step of the receive script.
#[derive(Debug, Clone)]
enum Step {
    /// Bytes available immediately. An empty chunk models a zero-byte
    /// read ("no data this cycle").
    Bytes(Vec<u8>),
    /// Silence on the wire for this long.
    Gap(Duration),
}

#[derive(Debug, Default)]
struct Inner {
    script: VecDeque<Step>,
    /// Log of all command frames written through this port.
    sent_log: Vec<Vec<u8>>,
    /// Cap on how many bytes the next `send()` reports written.
    next_write_limit: Option<usize>,
    disconnected: bool,
}

/// A scripted [`Transport`] for testing without hardware.
///
/// Created together with a [`MockPortHandle`]; the port moves into the
/// code under test while the handle stays with the test to extend the
/// script and inspect sent data.
#[derive(Debug)]
pub struct MockPort {
    inner: Arc<Mutex<Inner>>,
}

/// Test-side handle to a [`MockPort`].
#[derive(Debug, Clone)]
pub struct MockPortHandle {
    inner: Arc<Mutex<Inner>>,
}

impl MockPort {
    /// Create a connected mock port and its test-side handle.
    pub fn new() -> (MockPort, MockPortHandle) {
        let inner = Arc::new(Mutex::new(Inner::default()));
        (
            MockPort {
                inner: inner.clone(),
            },
            MockPortHandle { inner },
        )
    }
}

impl MockPortHandle {
    /// Append a chunk of bytes to the receive script.
    pub fn push_bytes(&self, data: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.script.push_back(Step::Bytes(data.to_vec()));
    }

    /// Append a zero-byte read ("no data this cycle") to the script.
    pub fn push_empty_read(&self) {
        self.push_bytes(&[]);
    }

    /// Append wire silence to the script.
    pub fn push_gap(&self, gap: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.script.push_back(Step::Gap(gap));
    }

    /// All command frames sent through the port so far, in order.
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        self.inner.lock().unwrap().sent_log.clone()
    }

    /// Make the next `send()` report at most `n` bytes written, to
    /// exercise short-write handling.
    pub fn limit_next_write(&self, n: usize) {
        self.inner.lock().unwrap().next_write_limit = Some(n);
    }

    /// Simulate the port going away.
    pub fn disconnect(&self) {
        self.inner.lock().unwrap().disconnected = true;
    }
}

#[async_trait]
impl Transport for MockPort {
    async fn send(&mut self, data: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        if inner.disconnected {
            return Err(Error::NotConnected);
        }
        inner.sent_log.push(data.to_vec());
        let written = match inner.next_write_limit.take() {
            Some(limit) => limit.min(data.len()),
            None => data.len(),
        };
        Ok(written)
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        // Yield first so spawned session loops interleave with the test
        // body on a single-threaded runtime even when the script keeps
        // answering immediately.
        tokio::task::yield_now().await;

        let mut inner = self.inner.lock().unwrap();
        if inner.disconnected {
            return Err(Error::NotConnected);
        }

        let mut remaining = timeout;
        loop {
            match inner.script.front_mut() {
                None => return Err(Error::Timeout),
                Some(Step::Gap(gap)) => {
                    if *gap > remaining {
                        *gap -= remaining;
                        return Err(Error::Timeout);
                    }
                    remaining -= *gap;
                    inner.script.pop_front();
                }
                Some(Step::Bytes(data)) => {
                    if data.is_empty() {
                        inner.script.pop_front();
                        return Ok(0);
                    }
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    if n == data.len() {
                        inner.script.pop_front();
                    } else {
                        data.drain(..n);
                    }
                    return Ok(n);
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.lock().unwrap().disconnected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.inner.lock().unwrap().disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_scripted_bytes() {
        let (mut port, handle) = MockPort::new();
        handle.push_bytes(&[0xAA, 0xBB]);

        let mut buf = [0u8; 8];
        let n = port
            .receive(&mut buf, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(&buf[..n], &[0xAA, 0xBB]);
    }

    #[tokio::test]
    async fn splits_chunk_across_small_buffers() {
        let (mut port, handle) = MockPort::new();
        handle.push_bytes(&[1, 2, 3, 4]);

        let mut buf = [0u8; 3];
        let n = port
            .receive(&mut buf, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(&buf[..n], &[1, 2, 3]);
        let n = port
            .receive(&mut buf, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(&buf[..n], &[4]);
    }

    #[tokio::test]
    async fn short_gap_elapses_within_deadline() {
        let (mut port, handle) = MockPort::new();
        handle.push_gap(Duration::from_millis(2));
        handle.push_bytes(&[0x42]);

        let mut buf = [0u8; 1];
        let n = port
            .receive(&mut buf, Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn long_gap_times_out_and_carries_over() {
        let (mut port, handle) = MockPort::new();
        handle.push_gap(Duration::from_millis(8));
        handle.push_bytes(&[0x42]);

        let mut buf = [0u8; 1];
        // First wait burns 5ms of the 8ms gap.
        let result = port.receive(&mut buf, Duration::from_millis(5)).await;
        assert!(matches!(result, Err(Error::Timeout)));

        // The remaining 3ms elapse within the next deadline.
        let n = port
            .receive(&mut buf, Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn empty_chunk_is_zero_byte_read() {
        let (mut port, handle) = MockPort::new();
        handle.push_empty_read();

        let mut buf = [0u8; 4];
        let n = port
            .receive(&mut buf, Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn exhausted_script_times_out() {
        let (mut port, _handle) = MockPort::new();
        let mut buf = [0u8; 4];
        let result = port.receive(&mut buf, Duration::from_millis(1)).await;
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn records_sent_frames_and_write_limit() {
        let (mut port, handle) = MockPort::new();
        handle.limit_next_write(3);

        let written = port.send(&[1, 2, 3, 4, 5]).await.unwrap();
        assert_eq!(written, 3);
        let written = port.send(&[6, 7]).await.unwrap();
        assert_eq!(written, 2);

        let sent = handle.sent_data();
        assert_eq!(sent, vec![vec![1, 2, 3, 4, 5], vec![6, 7]]);
    }

    #[tokio::test]
    async fn disconnect_fails_operations() {
        let (mut port, handle) = MockPort::new();
        handle.disconnect();
        assert!(!port.is_connected());

        let result = port.send(&[1]).await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }
}
