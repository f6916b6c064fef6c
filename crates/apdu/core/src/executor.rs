//! Card executor implementation
//!
//! The executor owns a [`CardTransport`], serialises commands, enforces the
//! receive buffer bound and remembers the decoded outcome of the last
//! exchange so callers that only see success/failure can still diagnose what
//! the token answered.

use bytes::Bytes;
use tracing::{Level, debug, info, warn};

use crate::command::{ApduCommand, RECV_BUFFER_SIZE};
use crate::response::Response;
use crate::response::outcome::{ResponseOutcome, decode_status};
use crate::transport::{CardTransport, TransportError};
use crate::{Command, Result};

/// Card executor implementation with a transport
#[derive(Debug)]
pub struct CardExecutor<T: CardTransport> {
    /// The transport used for communication
    transport: T,
    /// Outcome decoded from the last response
    last_outcome: Option<ResponseOutcome>,
}

impl<T: CardTransport> CardExecutor<T> {
    /// Create a new card executor with the given transport
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            last_outcome: None,
        }
    }

    /// Get a reference to the transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the executor and return the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Outcome of the last exchange
    ///
    /// `None` when nothing was exchanged yet or the transport itself failed.
    pub const fn last_outcome(&self) -> Option<ResponseOutcome> {
        self.last_outcome
    }

    /// Send a raw frame and return the raw response
    pub fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes> {
        self.last_outcome = None;

        let response = self.transport.transmit_raw(command)?;
        if response.len() > RECV_BUFFER_SIZE {
            debug!(
                length = response.len(),
                capacity = RECV_BUFFER_SIZE,
                "Response overflows receive buffer"
            );
            return Err(TransportError::BufferTooSmall {
                length: response.len(),
                capacity: RECV_BUFFER_SIZE,
            }
            .into());
        }

        // Only the outcome is kept; payloads may carry key material
        self.last_outcome = Some(decode_status(&response));
        Ok(response)
    }

    /// Send a generic command and return the parsed response
    pub fn transmit(&mut self, command: &Command) -> Result<Response> {
        self.execute(command)
    }

    /// Execute a typed command and parse its response
    pub fn execute<C>(&mut self, command: &C) -> core::result::Result<C::Success, C::Error>
    where
        C: ApduCommand,
    {
        let command_bytes = command.to_bytes()?;
        let response_bytes = self.transmit_raw(&command_bytes)?;
        let response = Response::from_bytes(&response_bytes)?;

        let status = response.status();
        let level = status.tracing_level();
        if level == Level::DEBUG {
            debug!(ins = command.instruction(), %status, "{}", status.description());
        } else if level == Level::INFO {
            info!(ins = command.instruction(), %status, "{}", status.description());
        } else {
            warn!(ins = command.instruction(), %status, "{}", status.description());
        }

        C::parse_response(response)
    }
}
