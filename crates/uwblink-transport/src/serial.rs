//! Serial port transport for the UWB module link.
//!
//! The module speaks raw binary over a plain 8N1 UART with no flow control,
//! so the configuration surface is deliberately small: a port path and a
//! baud rate from the set the hardware supports. Everything
//! protocol-shaped (framing, timeouts between bytes, session commands)
//! lives in `uwblink-rddrone`, which consumes this type through the
//! [`Transport`] trait.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use uwblink_core::error::{Error, Result};
use uwblink_core::transport::Transport;

/// Baud rates the module's UART can be configured for.
///
/// The module ships at 115200; the slower rates exist for long or noisy
/// cable runs.
pub const SUPPORTED_BAUD_RATES: [u32; 5] = [9_600, 19_200, 38_400, 57_600, 115_200];

/// Serial port transport to a UWB positioning module.
///
/// Fixed at 8 data bits, 1 stop bit, no parity, no flow control -- the
/// module supports nothing else.
pub struct SerialTransport {
    /// The underlying serial port stream; `None` after close.
    port: Option<SerialStream>,
    /// Port name for logging.
    port_name: String,
}

impl SerialTransport {
    /// Open a serial port to the module.
    ///
    /// `baud_rate` must be one of [`SUPPORTED_BAUD_RATES`]; anything else
    /// is rejected before touching the device. Open or configure failures
    /// are fatal at construction time -- there is no reconnect logic in
    /// this driver.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use uwblink_transport::SerialTransport;
    /// # async fn example() -> uwblink_core::Result<()> {
    /// let transport = SerialTransport::open("/dev/ttyS2", 115_200).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open(port: &str, baud_rate: u32) -> Result<Self> {
        if !SUPPORTED_BAUD_RATES.contains(&baud_rate) {
            return Err(Error::InvalidParameter(format!(
                "{baud_rate} is not a valid baud rate for the UWB module"
            )));
        }

        tracing::debug!(port = %port, baud_rate, "Opening serial port");

        let serial_stream = tokio_serial::new(port, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                tracing::error!(port = %port, error = %e, "Failed to open serial port");
                Error::Transport(format!("failed to open serial port {port}: {e}"))
            })?;

        tracing::info!(port = %port, baud_rate, "Serial port opened");

        Ok(Self {
            port: Some(serial_stream),
            port_name: port.to_string(),
        })
    }

    /// Get the name of the serial port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, data: &[u8]) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        tracing::trace!(port = %self.port_name, bytes = data.len(), data = ?data, "Sending command");

        // write() rather than write_all(): a short write on this link is a
        // condition the protocol engine logs and tolerates, not a failure.
        let written = port.write(data).await.map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "Failed to send command");
            if e.kind() == std::io::ErrorKind::BrokenPipe
                || e.kind() == std::io::ErrorKind::NotConnected
            {
                Error::ConnectionLost
            } else {
                Error::Io(e)
            }
        })?;

        port.flush().await.map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "Failed to flush serial port");
            Error::Io(e)
        })?;

        Ok(written)
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        match tokio::time::timeout(timeout, port.read(buf)).await {
            Ok(Ok(n)) => {
                tracing::trace!(
                    port = %self.port_name,
                    bytes = n,
                    data = ?&buf[..n],
                    "Received data"
                );
                Ok(n)
            }
            Ok(Err(e)) => {
                tracing::error!(port = %self.port_name, error = %e, "Failed to receive data");
                if e.kind() == std::io::ErrorKind::BrokenPipe
                    || e.kind() == std::io::ErrorKind::NotConnected
                {
                    Err(Error::ConnectionLost)
                } else {
                    Err(Error::Io(e))
                }
            }
            Err(_) => {
                tracing::trace!(
                    port = %self.port_name,
                    timeout_ms = timeout.as_millis(),
                    "Timeout waiting for data"
                );
                Err(Error::Timeout)
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            tracing::debug!(port = %self.port_name, "Closing serial port");
            if let Err(e) = port.flush().await {
                tracing::warn!(port = %self.port_name, error = %e, "Flush before close failed");
            }
            // Dropping the stream closes the port.
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_unsupported_baud_rate() {
        let result = SerialTransport::open("/dev/null", 460_800).await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn supported_rates_include_module_default() {
        assert!(SUPPORTED_BAUD_RATES.contains(&115_200));
    }
}
