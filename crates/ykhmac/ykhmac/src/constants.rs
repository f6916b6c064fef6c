//! Applet identifiers and command codes

/// YubiKey OTP applet, which hosts the HMAC challenge-response slots
pub const YUBIKEY_AID: &[u8] = b"\xA0\x00\x00\x05\x27\x20\x01";
/// Fidesmo HMAC challenge-response applet
pub const FIDESMO_AID: &[u8] = b"\xA0\x00\x00\x06\x17\x00\x07\x53\x4E\xAF\x01";
/// Longest AID accepted by SELECT
pub const AID_LENGTH_MAX: usize = 32;

/// Length of an HMAC-SHA1 token response
pub const HMAC_RESPONSE_LENGTH: usize = 20;
/// Challenge used to probe whether a slot is configured
pub const SLOT_PROBE_CHALLENGE: [u8; 8] = [0x42; 8];

/// Interindustry class byte
pub const CLA_ISO: u8 = 0x00;

/// Instruction bytes
pub mod ins {
    /// SELECT
    pub const SELECT: u8 = 0xA4;
    /// Vendor API request; P1 carries the command code
    pub const API_REQUEST: u8 = 0x01;
    /// Read the token status block
    pub const STATUS: u8 = 0x03;
}

/// P1 values
pub mod p1 {
    /// SELECT by application identifier
    pub const SELECT_BY_AID: u8 = 0x04;
}

/// API request command codes, sent in P1
pub mod cmd {
    /// Read the 32-bit serial number
    pub const GET_SERIAL: u8 = 0x10;
    /// HMAC-SHA1 challenge-response on slot 1
    pub const HMAC_SLOT_1: u8 = 0x30;
    /// HMAC-SHA1 challenge-response on slot 2
    pub const HMAC_SLOT_2: u8 = 0x38;
}
