//! Error types specific to card transport

use std::string::String;

/// Transport error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection error
    #[error("Failed to connect to device")]
    Connection,

    /// Transmission error
    #[error("Failed to transmit data")]
    Transmission,

    /// Device error
    #[error("Device error")]
    Device,

    /// Response does not fit the receive buffer
    #[error("Buffer too small: received {length} bytes (capacity {capacity})")]
    BufferTooSmall {
        /// Number of bytes the device sent
        length: usize,
        /// Receive buffer capacity
        capacity: usize,
    },

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a general other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }
}
