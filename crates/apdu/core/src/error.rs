//! Core error type for all APDU operations
//!
//! This module provides the error type used throughout the ykhmac_apdu_core crate.
//! Local framing failures are kept apart from transport failures so that callers
//! can tell "never sent" from "sent but the link failed".

use crate::transport::TransportError;

/// Result type for APDU operations
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    //
    // Transport related errors
    //
    /// The transport collaborator reported a failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    //
    // Command related errors
    //
    /// Command payload does not fit the hardware transfer buffer
    #[error("Payload too long: {length} bytes (max {max})")]
    PayloadTooLong {
        /// Length of the rejected payload
        length: usize,
        /// Largest payload a single frame can carry
        max: usize,
    },

    /// Raw command frame has an invalid length
    #[error("Invalid command length: {0}")]
    InvalidCommandLength(usize),

    //
    // Response related errors
    //
    /// Response frame shorter than the two status bytes
    #[error("Incomplete response: {0} bytes")]
    IncompleteResponse(usize),
}

impl Error {
    /// Create a new payload length error
    pub const fn payload_too_long(length: usize, max: usize) -> Self {
        Self::PayloadTooLong { length, max }
    }
}
