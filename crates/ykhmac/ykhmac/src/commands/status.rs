use ykhmac_apdu_core::{ApduCommand, Response};

use crate::constants::{CLA_ISO, ins};
use crate::types::Version;
use crate::{Error, Result};

/// Read the status block, whose first three bytes are the firmware version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStatusCommand;

impl ApduCommand for ReadStatusCommand {
    type Success = Version;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::STATUS
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> &[u8] {
        &[]
    }

    fn parse_response(response: Response) -> Result<Version> {
        Version::try_from(super::success_payload(&response)?)
    }
}
