//! APDU response definitions
//!
//! A response frame is `DATA(N) | SW1 | SW2`. This module splits the frame
//! into payload and [`StatusWord`] and maps the status word onto a
//! [`ResponseOutcome`].

pub mod outcome;
pub mod status;
pub mod utils;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::{Error, Result};
use outcome::ResponseOutcome;
use status::StatusWord;

/// Basic APDU response structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response payload data
    payload: Bytes,
    /// Status word
    status: StatusWord,
}

impl Response {
    /// Create a new response with payload and status
    pub fn new(payload: Bytes, status: impl Into<StatusWord>) -> Self {
        Self {
            payload,
            status: status.into(),
        }
    }

    /// Create a success response
    pub const fn success(payload: Bytes) -> Self {
        Self {
            payload,
            status: status::common::SUCCESS,
        }
    }

    /// Create an error response from a status word
    pub fn error(status: impl Into<StatusWord>) -> Self {
        Self {
            payload: Bytes::new(),
            status: status.into(),
        }
    }

    /// Parse response from raw bytes (including status word)
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (status, payload) = utils::extract_status_and_payload(data)?;

        trace!(
            sw1 = format_args!("{:#04x}", status.sw1),
            sw2 = format_args!("{:#04x}", status.sw2),
            payload_len = payload.len(),
            "Parsed APDU response"
        );

        Ok(Self {
            payload: Bytes::copy_from_slice(payload),
            status,
        })
    }

    /// Get the response payload data
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Get the status word
    pub const fn status(&self) -> StatusWord {
        self.status
    }

    /// Decode the status word into a response outcome
    pub const fn outcome(&self) -> ResponseOutcome {
        ResponseOutcome::from_status(self.status)
    }

    /// Check if the response indicates success
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get the status word as a tuple (SW1, SW2)
    pub const fn status_tuple(&self) -> (u8, u8) {
        (self.status.sw1, self.status.sw2)
    }
}

impl TryFrom<&[u8]> for Response {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self> {
        Self::from_bytes(data)
    }
}

impl TryFrom<Bytes> for Response {
    type Error = Error;

    fn try_from(data: Bytes) -> Result<Self> {
        Self::from_bytes(&data)
    }
}

impl From<Response> for Bytes {
    fn from(response: Response) -> Self {
        let mut buf = BytesMut::with_capacity(response.payload.len() + 2);
        buf.put_slice(&response.payload);
        buf.put_u8(response.status.sw1);
        buf.put_u8(response.status.sw2);
        buf.freeze()
    }
}
