use ykhmac_apdu_core::{ApduCommand, Response};

use crate::constants::{CLA_ISO, cmd, ins};
use crate::{Error, Result};

/// Read the token's 32-bit serial number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetSerialCommand;

impl ApduCommand for GetSerialCommand {
    type Success = u32;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::API_REQUEST
    }

    fn p1(&self) -> u8 {
        cmd::GET_SERIAL
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> &[u8] {
        &[]
    }

    fn parse_response(response: Response) -> Result<u32> {
        let payload = super::require_payload(&response, 4)?;
        Ok(u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]))
    }
}
