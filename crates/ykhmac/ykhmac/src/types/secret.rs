use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::SECRET_KEY_LENGTH;
use crate::constants::HMAC_RESPONSE_LENGTH;
use crate::{Error, Result};

/// HMAC-SHA1 key shared between the token slot and the enrolment
///
/// The key is wiped when dropped and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; SECRET_KEY_LENGTH]);

impl SecretKey {
    /// Wrap raw key bytes
    pub const fn new(bytes: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse a key from hex
    ///
    /// Up to 40 hex digits are accepted. Shorter input is right-padded with
    /// zero bytes, as when a token slot is programmed with a short key.
    pub fn from_hex(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.len() > SECRET_KEY_LENGTH * 2 {
            return Err(Error::InvalidArgument("secret key is longer than 40 hex digits"));
        }
        if input.len() % 2 != 0 {
            return Err(Error::InvalidArgument("secret key has an odd number of hex digits"));
        }

        let mut key = [0u8; SECRET_KEY_LENGTH];
        hex::decode_to_slice(input, &mut key[..input.len() / 2])
            .map_err(|_| Error::InvalidArgument("secret key is not valid hex"))?;
        Ok(Self(key))
    }

    /// Borrow the raw key bytes
    pub const fn as_bytes(&self) -> &[u8; SECRET_KEY_LENGTH] {
        &self.0
    }
}

impl From<[u8; SECRET_KEY_LENGTH]> for SecretKey {
    fn from(bytes: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SecretKey {}

/// HMAC-SHA1 output returned by the token for one challenge
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DeviceResponse([u8; HMAC_RESPONSE_LENGTH]);

impl DeviceResponse {
    /// Take the first 20 bytes of a response payload
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let Some(bytes) = payload.get(..HMAC_RESPONSE_LENGTH) else {
            return Err(Error::ResponseTooShort {
                expected: HMAC_RESPONSE_LENGTH,
                actual: payload.len(),
            });
        };
        let mut response = Self([0u8; HMAC_RESPONSE_LENGTH]);
        response.0.copy_from_slice(bytes);
        Ok(response)
    }

    /// Borrow the raw response bytes
    pub const fn as_bytes(&self) -> &[u8; HMAC_RESPONSE_LENGTH] {
        &self.0
    }

    /// Constant-time comparison against a locally computed digest
    pub fn matches(&self, digest: &[u8; HMAC_RESPONSE_LENGTH]) -> bool {
        self.0.ct_eq(digest).into()
    }
}

impl From<[u8; HMAC_RESPONSE_LENGTH]> for DeviceResponse {
    fn from(bytes: [u8; HMAC_RESPONSE_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for DeviceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeviceResponse(..)")
    }
}

impl PartialEq for DeviceResponse {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for DeviceResponse {}
