//! APDU command definitions and traits
//!
//! Commands are short frames: `CLA | INS | P1 | P2 | LC | DATA(LC)`. The LC byte
//! is always present, even for empty payloads, because the token firmware
//! expects a fixed five byte header.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Error, Response, Result};

/// Size of the hardware transfer buffer shared by both directions
pub const HW_BUFFER_SIZE: usize = 64;
/// Bytes available for an outgoing frame
pub const SEND_BUFFER_SIZE: usize = HW_BUFFER_SIZE - 2;
/// Bytes available for an incoming frame, status word included
pub const RECV_BUFFER_SIZE: usize = HW_BUFFER_SIZE - 8;
/// CLA, INS, P1, P2 and LC
pub const HEADER_LENGTH: usize = 5;
/// Largest data payload a single command frame can carry
pub const MAX_COMMAND_PAYLOAD: usize = SEND_BUFFER_SIZE - HEADER_LENGTH;

/// Core trait for APDU commands
pub trait ApduCommand {
    /// Success response type
    type Success;

    /// Error response type
    type Error: From<Error>;

    /// Command class (CLA)
    fn class(&self) -> u8;

    /// Instruction code (INS)
    fn instruction(&self) -> u8;

    /// First parameter (P1)
    fn p1(&self) -> u8;

    /// Second parameter (P2)
    fn p2(&self) -> u8;

    /// Command payload data
    fn data(&self) -> &[u8];

    /// Check the command fits a single frame
    fn validate(&self) -> Result<()> {
        let length = self.data().len();
        if length > MAX_COMMAND_PAYLOAD {
            return Err(Error::payload_too_long(length, MAX_COMMAND_PAYLOAD));
        }
        Ok(())
    }

    /// Convert to raw APDU bytes
    fn to_bytes(&self) -> Result<Bytes> {
        self.validate()?;

        let data = self.data();
        let mut buffer = BytesMut::with_capacity(self.command_length());

        // Header: CLA, INS, P1, P2
        buffer.put_u8(self.class());
        buffer.put_u8(self.instruction());
        buffer.put_u8(self.p1());
        buffer.put_u8(self.p2());

        // Lc is always present; validate() keeps it within a byte
        buffer.put_u8(data.len() as u8);
        buffer.put_slice(data);

        Ok(buffer.freeze())
    }

    /// Calculate length of serialized command
    fn command_length(&self) -> usize {
        HEADER_LENGTH + self.data().len()
    }

    /// Convert to a generic Command
    fn to_command(&self) -> Command {
        Command {
            cla: self.class(),
            ins: self.instruction(),
            p1: self.p1(),
            p2: self.p2(),
            data: Bytes::copy_from_slice(self.data()),
        }
    }

    /// Parse response into the command's response type
    fn parse_response(response: Response) -> core::result::Result<Self::Success, Self::Error>;
}

/// Generic APDU command structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data, possibly empty
    pub data: Bytes,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Bytes::new(),
        }
    }

    /// Create a new command with data payload
    ///
    /// Fails without allocating a frame if the payload exceeds
    /// [`MAX_COMMAND_PAYLOAD`].
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Result<Self> {
        Self::new(cla, ins, p1, p2).with_data(data)
    }

    /// Set the data field
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Result<Self> {
        let data = data.into();
        if data.len() > MAX_COMMAND_PAYLOAD {
            return Err(Error::payload_too_long(data.len(), MAX_COMMAND_PAYLOAD));
        }
        self.data = data;
        Ok(self)
    }

    /// Parse a command from raw bytes
    ///
    /// A bare four byte header is accepted as a command without payload.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::InvalidCommandLength(data.len()));
        }

        let mut command = Self::new(data[0], data[1], data[2], data[3]);
        if data.len() == 4 {
            return Ok(command);
        }

        let lc = data[4] as usize;
        if data.len() != HEADER_LENGTH + lc {
            return Err(Error::InvalidCommandLength(data.len()));
        }
        if lc > 0 {
            command.data = Bytes::copy_from_slice(&data[HEADER_LENGTH..]);
        }

        Ok(command)
    }
}

impl ApduCommand for Command {
    type Success = Response;
    type Error = Error;

    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        self.ins
    }

    fn p1(&self) -> u8 {
        self.p1
    }

    fn p2(&self) -> u8 {
        self.p2
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        Ok(response)
    }
}
