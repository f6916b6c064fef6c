//! Command set of the HMAC challenge-response applet
//!
//! Each command implements [`ApduCommand`](ykhmac_apdu_core::ApduCommand)
//! and parses its own response, so a non-success status or a short payload
//! surfaces as a typed [`Error`](crate::Error).

mod hmac;
mod select;
mod serial;
mod status;

pub use hmac::HmacCommand;
pub use select::SelectCommand;
pub use serial::GetSerialCommand;
pub use status::ReadStatusCommand;

use ykhmac_apdu_core::Response;

use crate::{Error, Result};

/// Payload of a successful response, or the status as an error
fn success_payload(response: &Response) -> Result<&[u8]> {
    if response.is_success() {
        Ok(&response.payload()[..])
    } else {
        Err(Error::status(response.status()))
    }
}

/// Payload of a successful response carrying at least `expected` bytes
fn require_payload(response: &Response, expected: usize) -> Result<&[u8]> {
    let payload = success_payload(response)?;
    if payload.len() < expected {
        return Err(Error::ResponseTooShort {
            expected,
            actual: payload.len(),
        });
    }
    Ok(payload)
}
