use bytes::Bytes;
use ykhmac_apdu_core::{ApduCommand, Response};

use crate::constants::{AID_LENGTH_MAX, CLA_ISO, ins, p1};
use crate::{Error, Result};

/// SELECT an applet by its AID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectCommand {
    aid: Bytes,
}

impl SelectCommand {
    /// Build a SELECT for the given AID
    pub fn with_aid(aid: &[u8]) -> Result<Self> {
        if aid.len() > AID_LENGTH_MAX {
            return Err(Error::InvalidArgument("AID is longer than 32 bytes"));
        }
        Ok(Self {
            aid: Bytes::copy_from_slice(aid),
        })
    }

    /// The AID being selected
    pub fn aid(&self) -> &[u8] {
        &self.aid
    }
}

impl ApduCommand for SelectCommand {
    type Success = ();
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO
    }

    fn instruction(&self) -> u8 {
        ins::SELECT
    }

    fn p1(&self) -> u8 {
        p1::SELECT_BY_AID
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> &[u8] {
        &self.aid
    }

    fn parse_response(response: Response) -> Result<()> {
        super::success_payload(&response).map(|_| ())
    }
}
