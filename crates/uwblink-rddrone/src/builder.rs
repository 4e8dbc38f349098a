//! Fluent construction of a driver session.

use std::time::Duration;

use tokio::sync::broadcast;

use uwblink_core::report::{ReportSink, UwbReport};
use uwblink_core::transport::Transport;
use uwblink_transport::SerialTransport;

use crate::framer::{FramerConfig, DEFAULT_INTER_BYTE_TIMEOUT, DEFAULT_STARTUP_TIMEOUT};
use crate::session::{spawn_session, RddroneHandle, SessionConfig};

/// Default broadcast capacity for the report channel. Distance results
/// arrive tens of times per second; this buys a lagging subscriber about
/// two seconds before it starts missing records.
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Builder for a UWB ranging session.
///
/// # Example
///
/// ```no_run
/// # use uwblink_rddrone::RddroneBuilder;
/// # async fn example() -> uwblink_core::Result<()> {
/// let (driver, mut reports) = RddroneBuilder::new("/dev/ttyS2")
///     .baud_rate(115_200)
///     .start()
///     .await?;
///
/// while let Ok(report) = reports.recv().await {
///     println!("{report:?}");
/// }
/// # driver.request_stop();
/// # Ok(())
/// # }
/// ```
pub struct RddroneBuilder {
    device: String,
    baud_rate: u32,
    inter_byte_timeout: Duration,
    startup_timeout: Duration,
    max_plausible_cm: Option<f32>,
    channel_capacity: usize,
}

impl RddroneBuilder {
    /// Start building a session against the given serial device.
    pub fn new(device: impl Into<String>) -> Self {
        RddroneBuilder {
            device: device.into(),
            baud_rate: 115_200,
            inter_byte_timeout: DEFAULT_INTER_BYTE_TIMEOUT,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            max_plausible_cm: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// UART baud rate (default 115200, the module's shipping rate).
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Maximum idle time between bytes of one message (default 5 ms).
    /// Must stay below the module's inter-message idle time.
    pub fn inter_byte_timeout(mut self, timeout: Duration) -> Self {
        self.inter_byte_timeout = timeout;
        self
    }

    /// How long to wait for the first byte of a message before logging
    /// that the module is unresponsive (default 10 s).
    pub fn startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// Enable the plausibility gate: decoded positions and distances with
    /// any component above this many centimeters (or non-finite) are
    /// discarded instead of published. Off by default.
    pub fn max_plausible_cm(mut self, limit: f32) -> Self {
        self.max_plausible_cm = Some(limit);
        self
    }

    /// Capacity of the report broadcast channel (default 64).
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Open the serial port and spawn the session.
    ///
    /// Returns the session handle and a subscription to the report feed.
    /// Additional subscribers can be created with
    /// [`broadcast::Receiver::resubscribe`].
    pub async fn start(
        self,
    ) -> uwblink_core::Result<(RddroneHandle, broadcast::Receiver<UwbReport>)> {
        let transport = SerialTransport::open(&self.device, self.baud_rate).await?;
        Ok(self.start_with_transport(Box::new(transport)))
    }

    /// Spawn the session over an already-constructed transport.
    ///
    /// This is how tests and simulators inject a scripted port; `start`
    /// funnels through it after opening the real device.
    pub fn start_with_transport(
        self,
        transport: Box<dyn Transport>,
    ) -> (RddroneHandle, broadcast::Receiver<UwbReport>) {
        let (tx, rx) = broadcast::channel(self.channel_capacity);
        let handle = self.start_with_sink(transport, Box::new(tx));
        (handle, rx)
    }

    /// Spawn the session publishing into a caller-supplied sink instead of
    /// the default broadcast channel.
    pub fn start_with_sink(
        self,
        transport: Box<dyn Transport>,
        sink: Box<dyn ReportSink>,
    ) -> RddroneHandle {
        let config = SessionConfig {
            framer: FramerConfig {
                startup_timeout: self.startup_timeout,
                inter_byte_timeout: self.inter_byte_timeout,
            },
            max_plausible_cm: self.max_plausible_cm,
        };
        spawn_session(transport, config, sink)
    }
}
