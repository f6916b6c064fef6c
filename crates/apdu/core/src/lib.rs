//! Core traits and types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the wire codec used to talk to HMAC challenge-response
//! tokens over a small, fixed-size hardware transfer buffer:
//!
//! - Building short command frames (`CLA | INS | P1 | P2 | LC | DATA`) and
//!   rejecting payloads that would not fit the transfer buffer
//! - Parsing response frames (`DATA | SW1 | SW2`) and decoding the status
//!   trailer into a [`ResponseOutcome`]
//! - A [`CardTransport`] abstraction over the physical link and a
//!   [`CardExecutor`] that keeps the last outcome around for diagnostics
//!
//! Status decoding follows the ISO/IEC 7816-4 status word convention used by
//! the token firmware.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Main modules
pub mod command;
pub mod executor;
pub mod response;
pub mod transport;

// Core error types
mod error;
pub use error::{Error, Result};

// Re-exports for common types
pub use command::{
    ApduCommand, Command, HEADER_LENGTH, HW_BUFFER_SIZE, MAX_COMMAND_PAYLOAD, RECV_BUFFER_SIZE,
    SEND_BUFFER_SIZE,
};
pub use executor::CardExecutor;
pub use response::outcome::{ResponseOutcome, decode_status};
pub use response::status::StatusWord;
pub use response::{Response, utils};
pub use transport::{CardTransport, TransportError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Bytes, BytesMut, CardExecutor, Command, Error, Response, ResponseOutcome, Result,
        command::ApduCommand,
        response::outcome::decode_status,
        response::status::StatusWord,
        transport::{CardTransport, TransportError},
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    // Test the basic types are re-exported correctly
    #[test]
    fn test_reexports() {
        let cmd = Command::new(0x00, 0xA4, 0x04, 0x00);
        assert_eq!(cmd.class(), 0x00);
        assert_eq!(cmd.instruction(), 0xA4);
        assert_eq!(cmd.p1(), 0x04);
        assert_eq!(cmd.p2(), 0x00);

        let resp = Response::success(Bytes::from_static(&[0x01, 0x02, 0x03]));
        assert!(resp.is_success());
        assert_eq!(resp.payload().as_ref(), &[0x01, 0x02, 0x03]);
        assert_eq!(resp.status(), StatusWord::new(0x90, 0x00));
        assert_eq!(resp.outcome(), ResponseOutcome::Success);
    }
}
