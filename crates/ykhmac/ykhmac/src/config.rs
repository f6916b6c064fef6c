//! Canonical protocol configuration
//!
//! All buffer sizes used by the credential lifecycle derive from the
//! constants below. They are fixed at compile time because every buffer that
//! holds key material lives on the stack.

use ykhmac_apdu_core::MAX_COMMAND_PAYLOAD;

/// Length of the persisted challenge
pub const CHALLENGE_LENGTH: usize = 32;
/// Length of the enrolled secret key (an HMAC-SHA1 key as programmed into the token)
pub const SECRET_KEY_LENGTH: usize = 20;
/// AES block length
pub const CIPHER_BLOCK_LENGTH: usize = 16;
/// AES-128 key length; the HMAC-derived wrapping key is truncated to this
pub const CIPHER_KEY_LENGTH: usize = 16;
/// Secret key length rounded up to a whole number of cipher blocks
pub const WRAPPED_SECRET_LENGTH: usize = SECRET_KEY_LENGTH.div_ceil(CIPHER_BLOCK_LENGTH) * CIPHER_BLOCK_LENGTH;
/// Bytes occupied by one credential record
pub const RECORD_LENGTH: usize = CHALLENGE_LENGTH + CIPHER_BLOCK_LENGTH + WRAPPED_SECRET_LENGTH;

const _: () = assert!(CHALLENGE_LENGTH <= MAX_COMMAND_PAYLOAD);
const _: () = assert!(CIPHER_KEY_LENGTH <= crate::constants::HMAC_RESPONSE_LENGTH);
const _: () = assert!(WRAPPED_SECRET_LENGTH % CIPHER_BLOCK_LENGTH == 0);

/// Protocol constants gathered in one place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Length of the persisted challenge
    pub challenge_length: usize,
    /// Length of the enrolled secret key
    pub secret_key_length: usize,
    /// Cipher block length, also the IV length
    pub cipher_block_length: usize,
    /// Cipher key length
    pub cipher_key_length: usize,
    /// Largest payload a single command frame can carry
    pub max_command_payload: usize,
}

impl ProtocolConfig {
    /// The configuration this crate is built for
    pub const CANONICAL: Self = Self {
        challenge_length: CHALLENGE_LENGTH,
        secret_key_length: SECRET_KEY_LENGTH,
        cipher_block_length: CIPHER_BLOCK_LENGTH,
        cipher_key_length: CIPHER_KEY_LENGTH,
        max_command_payload: MAX_COMMAND_PAYLOAD,
    };

    /// Length of the zero-padded, encrypted secret
    pub const fn wrapped_secret_length(&self) -> usize {
        self.secret_key_length.div_ceil(self.cipher_block_length) * self.cipher_block_length
    }

    /// Bytes occupied by one credential record
    pub const fn record_length(&self) -> usize {
        self.challenge_length + self.cipher_block_length + self.wrapped_secret_length()
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::CANONICAL
    }
}
