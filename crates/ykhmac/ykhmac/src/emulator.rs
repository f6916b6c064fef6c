//! Software token
//!
//! [`SoftToken`] answers the applet's command set the way a physical token
//! does, computing slot responses with the same HMAC-SHA1 as the host side.
//! It stands in for the physical link in tests and in the simulator.

use bytes::Bytes;
use tracing::trace;
use ykhmac_apdu_core::response::status::common;
use ykhmac_apdu_core::{CardTransport, Command, Response, StatusWord, TransportError};

use crate::constants::{CLA_ISO, YUBIKEY_AID, cmd, ins, p1};
use crate::crypto::compute_hmac;
use crate::types::{SecretKey, Slot, Version};

/// Emulated HMAC challenge-response token
#[derive(Debug, Clone)]
pub struct SoftToken {
    aid: Bytes,
    serial: u32,
    version: Version,
    slots: [Option<SecretKey>; 2],
    selected: bool,
    present: bool,
}

impl SoftToken {
    /// A token hosting the applet at the default AID, with no slot configured
    pub fn new(serial: u32, version: Version) -> Self {
        Self {
            aid: Bytes::from_static(YUBIKEY_AID),
            serial,
            version,
            slots: [None, None],
            selected: false,
            present: true,
        }
    }

    /// Host the applet at a different AID
    pub fn with_aid(mut self, aid: &[u8]) -> Self {
        self.aid = Bytes::copy_from_slice(aid);
        self
    }

    /// Program `slot` with an HMAC-SHA1 secret
    pub fn with_slot(mut self, slot: Slot, secret: SecretKey) -> Self {
        self.configure_slot(slot, Some(secret));
        self
    }

    /// Program or clear `slot`
    pub fn configure_slot(&mut self, slot: Slot, secret: Option<SecretKey>) {
        self.slots[slot_index(slot)] = secret;
    }

    /// Move the token in or out of the field
    ///
    /// A token that leaves the field loses its applet selection.
    pub fn set_present(&mut self, present: bool) {
        self.present = present;
        if !present {
            self.selected = false;
        }
    }

    /// Whether the applet is selected
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    fn process(&mut self, command: &Command) -> Response {
        if command.cla != CLA_ISO {
            return Response::error(common::CLASS_NOT_SUPPORTED);
        }

        match command.ins {
            ins::SELECT => self.select(command),
            _ if !self.selected => Response::error(common::CONDITIONS_NOT_SATISFIED),
            ins::STATUS => self.status(),
            ins::API_REQUEST => self.api_request(command),
            _ => Response::error(common::INVALID_INSTRUCTION),
        }
    }

    fn select(&mut self, command: &Command) -> Response {
        if command.p1 != p1::SELECT_BY_AID {
            return Response::error(common::INCORRECT_P1P2);
        }
        self.selected = command.data == self.aid;
        if self.selected {
            Response::success(Bytes::copy_from_slice(&self.version.to_bytes()))
        } else {
            Response::error(common::FILE_NOT_FOUND)
        }
    }

    fn status(&self) -> Response {
        let mut block = self.version.to_bytes().to_vec();
        // Program sequence, touch level
        block.extend_from_slice(&[0x01, 0x00, 0x00]);
        Response::success(Bytes::from(block))
    }

    fn api_request(&self, command: &Command) -> Response {
        let slot = match command.p1 {
            cmd::GET_SERIAL => {
                return Response::success(Bytes::copy_from_slice(&self.serial.to_be_bytes()));
            }
            cmd::HMAC_SLOT_1 => Slot::Slot1,
            cmd::HMAC_SLOT_2 => Slot::Slot2,
            _ => return Response::error(common::INCORRECT_P1P2),
        };

        let Some(secret) = &self.slots[slot_index(slot)] else {
            return Response::error(common::CONDITIONS_NOT_SATISFIED);
        };
        match compute_hmac(secret.as_bytes(), &command.data) {
            Ok(digest) => Response::success(Bytes::copy_from_slice(digest.as_slice())),
            Err(_) => Response::error(StatusWord::new(0x6F, 0x00)),
        }
    }
}

const fn slot_index(slot: Slot) -> usize {
    match slot {
        Slot::Slot1 => 0,
        Slot::Slot2 => 1,
    }
}

impl CardTransport for SoftToken {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        if !self.present {
            return Err(TransportError::Connection);
        }

        let response = match Command::from_bytes(command) {
            Ok(command) => self.process(&command),
            Err(_) => Response::error(common::WRONG_LENGTH),
        };
        trace!(status = %response.status(), "Soft token answered");
        Ok(response.into())
    }
}
