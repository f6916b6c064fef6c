use bytes::Bytes;
use ykhmac_apdu_core::{ApduCommand, MAX_COMMAND_PAYLOAD, Response};

use crate::constants::{CLA_ISO, HMAC_RESPONSE_LENGTH, ins};
use crate::types::{DeviceResponse, Slot};
use crate::{Error, Result};

/// HMAC-SHA1 challenge-response on one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HmacCommand {
    slot: Slot,
    challenge: Bytes,
}

impl HmacCommand {
    /// Build a challenge-response for the slot
    ///
    /// The challenge must fit a single command frame.
    pub fn with_challenge(slot: Slot, challenge: &[u8]) -> Result<Self> {
        if challenge.len() > MAX_COMMAND_PAYLOAD {
            return Err(Error::InvalidArgument(
                "challenge does not fit a single command frame",
            ));
        }
        Ok(Self {
            slot,
            challenge: Bytes::copy_from_slice(challenge),
        })
    }

    /// Slot the challenge is sent to
    pub const fn slot(&self) -> Slot {
        self.slot
    }
}

impl ApduCommand for HmacCommand {
    type Success = DeviceResponse;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::API_REQUEST
    }

    fn p1(&self) -> u8 {
        self.slot.hmac_command()
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> &[u8] {
        &self.challenge
    }

    fn parse_response(response: Response) -> Result<DeviceResponse> {
        DeviceResponse::from_payload(super::require_payload(&response, HMAC_RESPONSE_LENGTH)?)
    }
}
