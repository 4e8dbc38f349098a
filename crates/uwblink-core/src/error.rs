//! Error types for uwblink.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer and frame-layer errors
//! are all captured here.

/// The error type for all uwblink operations.
///
/// Variants cover the failure modes encountered when talking to a UWB
/// positioning module over a serial link: transport faults, malformed
/// frames, and read deadlines.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open/configure failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// A structurally invalid frame (wrong length or bad stop byte).
    ///
    /// Malformed frames are a normal operating condition on a serial link
    /// with no delimiters -- callers count and discard them rather than
    /// treating them as faults.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// A bounded read elapsed without any data arriving.
    #[error("timeout waiting for data")]
    Timeout,

    /// An invalid parameter was passed at configuration time.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the module has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the module was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
