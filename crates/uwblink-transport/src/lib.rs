//! Serial transport implementation for uwblink.
//!
//! This crate provides [`SerialTransport`], the concrete implementation of
//! the [`Transport`](uwblink_core::Transport) trait for the UART link to a
//! UWB positioning module (typically a USB virtual COM port or an onboard
//! flight-controller UART).
//!
//! # Example
//!
//! ```no_run
//! use uwblink_transport::SerialTransport;
//! use uwblink_core::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> uwblink_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyS2", 115_200).await?;
//!
//! // Request a grid survey.
//! let mut cmd = [0u8; 20];
//! cmd[..4].copy_from_slice(&[0x8E, 0x00, 0x11, 0x01]);
//! transport.send(&cmd).await?;
//!
//! // Wait up to 10 seconds for the first response byte.
//! let mut buf = [0u8; 163];
//! let n = transport.receive(&mut buf, Duration::from_secs(10)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{SerialTransport, SUPPORTED_BAUD_RATES};
