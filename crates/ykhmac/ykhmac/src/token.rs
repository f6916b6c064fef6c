//! Token API
//!
//! [`Token`] drives the HMAC challenge-response applet over any
//! [`CardTransport`]. Inputs are validated before a frame is built, so a
//! rejected argument never reaches the transport.

use tracing::{debug, warn};
use ykhmac_apdu_core::prelude::*;

use crate::Result;
use crate::commands::{GetSerialCommand, HmacCommand, ReadStatusCommand, SelectCommand};
use crate::constants::SLOT_PROBE_CHALLENGE;
use crate::types::{DeviceResponse, Slot, SlotSet, Version};

/// HMAC challenge-response token reached through a transport
#[derive(Debug)]
pub struct Token<T: CardTransport> {
    executor: CardExecutor<T>,
}

impl<T: CardTransport> Token<T> {
    /// Create a token over the given transport
    pub const fn new(transport: T) -> Self {
        Self {
            executor: CardExecutor::new(transport),
        }
    }

    /// Get a reference to the executor
    pub const fn executor(&self) -> &CardExecutor<T> {
        &self.executor
    }

    /// Get a reference to the transport
    pub const fn transport(&self) -> &T {
        self.executor.transport()
    }

    /// Get a mutable reference to the transport
    pub const fn transport_mut(&mut self) -> &mut T {
        self.executor.transport_mut()
    }

    /// Consume the token and return the transport
    pub fn into_transport(self) -> T {
        self.executor.into_transport()
    }

    /// Outcome of the most recent exchange
    ///
    /// `None` before the first exchange and after a transport failure.
    pub const fn last_outcome(&self) -> Option<ResponseOutcome> {
        self.executor.last_outcome()
    }

    /// Select an applet by AID
    pub fn select(&mut self, aid: &[u8]) -> Result<()> {
        let command = SelectCommand::with_aid(aid)?;
        debug!(aid = %hex::encode(aid), "Selecting applet");
        self.executor.execute(&command).inspect_err(|e| {
            warn!(aid = %hex::encode(aid), error = %e, "Applet selection failed");
        })
    }

    /// Read the 32-bit serial number
    pub fn read_serial(&mut self) -> Result<u32> {
        let serial = self.executor.execute(&GetSerialCommand)?;
        debug!(serial, "Read token serial");
        Ok(serial)
    }

    /// Read the firmware version
    pub fn read_version(&mut self) -> Result<Version> {
        let version = self.executor.execute(&ReadStatusCommand)?;
        debug!(%version, "Read token version");
        Ok(version)
    }

    /// Run an HMAC-SHA1 challenge-response on `slot`
    pub fn exchange_hmac(&mut self, slot: Slot, challenge: &[u8]) -> Result<DeviceResponse> {
        let command = HmacCommand::with_challenge(slot, challenge)?;
        debug!(%slot, length = challenge.len(), "Sending HMAC challenge");
        self.executor.execute(&command)
    }

    /// Whether `slot` answers a challenge-response
    ///
    /// The response itself is discarded.
    pub fn probe_slot(&mut self, slot: Slot) -> bool {
        match self.exchange_hmac(slot, &SLOT_PROBE_CHALLENGE) {
            Ok(_) => true,
            Err(e) => {
                debug!(%slot, error = %e, "Slot did not answer probe");
                false
            }
        }
    }

    /// Probe both slots in order and report the configured ones
    pub fn find_slots(&mut self) -> SlotSet {
        let slots: SlotSet = Slot::ALL
            .into_iter()
            .filter(|slot| self.probe_slot(*slot))
            .collect();
        debug!(%slots, "Slot discovery finished");
        slots
    }
}
