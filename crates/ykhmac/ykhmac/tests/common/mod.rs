//! Common test utilities

#![allow(dead_code)]

use std::collections::VecDeque;

use ykhmac::constants::{YUBIKEY_AID, cmd, ins};
use ykhmac::{
    CardTransport, MemoryStore, PersistentStore, RandomSource, SecretKey, Slot, SoftToken,
    StoreError, Token, TransportError, Version,
};
use ykhmac_apdu_core::{Bytes, Command};

/// Secret programmed into the demo token
pub const DEMO_SECRET: &str = "b6e3f555562c894b7af13b1db37f28deff3ea89b";

pub fn demo_secret() -> SecretKey {
    SecretKey::from_hex(DEMO_SECRET).unwrap()
}

/// Software token with `slot` programmed with the demo secret
pub fn demo_token(slot: Slot) -> SoftToken {
    SoftToken::new(1_234_567, Version::new(5, 4, 3)).with_slot(slot, demo_secret())
}

/// Token API over `transport` with the applet already selected
pub fn selected<T: CardTransport>(transport: T) -> Token<T> {
    let mut token = Token::new(transport);
    token.select(YUBIKEY_AID).unwrap();
    token
}

/// Random source replaying a fixed byte sequence, then a fill byte
#[derive(Debug)]
pub struct ScriptedRandom {
    bytes: VecDeque<u8>,
    fill: u8,
}

impl ScriptedRandom {
    pub fn new(bytes: impl IntoIterator<Item = u8>, fill: u8) -> Self {
        Self {
            bytes: bytes.into_iter().collect(),
            fill,
        }
    }

    /// Challenge of all `challenge` bytes followed by an IV of all `iv` bytes
    pub fn record(challenge: u8, iv: u8, fill: u8) -> Self {
        Self::new(
            std::iter::repeat_n(challenge, 32).chain(std::iter::repeat_n(iv, 16)),
            fill,
        )
    }
}

impl RandomSource for ScriptedRandom {
    fn next_random_byte(&mut self) -> u8 {
        self.bytes.pop_front().unwrap_or(self.fill)
    }
}

/// Transport wrapper recording every frame and answer
#[derive(Debug)]
pub struct Recording<T> {
    pub inner: T,
    pub commands: Vec<Vec<u8>>,
    pub responses: Vec<Vec<u8>>,
}

impl<T> Recording<T> {
    pub const fn new(inner: T) -> Self {
        Self {
            inner,
            commands: Vec::new(),
            responses: Vec::new(),
        }
    }
}

impl<T: CardTransport> CardTransport for Recording<T> {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.commands.push(command.to_vec());
        let response = self.inner.transmit_raw(command)?;
        self.responses.push(response.to_vec());
        Ok(response)
    }
}

/// Transport answering challenge-responses with a canned frame
///
/// SELECT always succeeds and any other request is rejected.
#[derive(Debug)]
pub struct Canned {
    pub hmac_slot1: Vec<u8>,
    pub hmac_slot2: Vec<u8>,
    pub commands: Vec<Vec<u8>>,
}

impl Canned {
    pub fn new(hmac_slot1: &[u8], hmac_slot2: &[u8]) -> Self {
        Self {
            hmac_slot1: hmac_slot1.to_vec(),
            hmac_slot2: hmac_slot2.to_vec(),
            commands: Vec::new(),
        }
    }

    /// Only slot 2 is configured
    pub fn slot2_only() -> Self {
        let mut configured = vec![0x5A; 20];
        configured.extend_from_slice(&[0x90, 0x00]);
        Self::new(&[0x69, 0x85], &configured)
    }
}

impl CardTransport for Canned {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.commands.push(command.to_vec());
        let command = Command::from_bytes(command).map_err(|_| TransportError::Transmission)?;
        let response = match (command.ins, command.p1) {
            (ins::SELECT, _) => vec![0x90, 0x00],
            (ins::API_REQUEST, cmd::HMAC_SLOT_1) => self.hmac_slot1.clone(),
            (ins::API_REQUEST, cmd::HMAC_SLOT_2) => self.hmac_slot2.clone(),
            _ => vec![0x6D, 0x00],
        };
        Ok(Bytes::from(response))
    }
}

/// Store whose writes start failing after a number of successful ones
#[derive(Debug)]
pub struct FailingStore {
    pub inner: MemoryStore,
    pub writes_left: usize,
}

impl FailingStore {
    pub fn new(inner: MemoryStore, writes_left: usize) -> Self {
        Self { inner, writes_left }
    }
}

impl PersistentStore for FailingStore {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        self.inner.read(offset, buf)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError> {
        if self.writes_left == 0 {
            return Err(StoreError::Io("EEPROM write failed".to_string()));
        }
        self.writes_left -= 1;
        self.inner.write(offset, data)
    }
}
