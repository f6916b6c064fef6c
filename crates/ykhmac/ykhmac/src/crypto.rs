//! HMAC-SHA1 and the AES-CBC key wrap
//!
//! The enrolled secret is stored encrypted under a key that only a live
//! token exchange can reproduce: `HMAC-SHA1(secret, challenge)` truncated to
//! an AES-128 key. The secret is zero-padded to whole cipher blocks, so no
//! padding scheme is involved and unwrapping cannot detect a wrong key.

use aes::Aes128;
use cipher::block_padding::NoPadding;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::config::{
    CHALLENGE_LENGTH, CIPHER_BLOCK_LENGTH, CIPHER_KEY_LENGTH, SECRET_KEY_LENGTH,
    WRAPPED_SECRET_LENGTH,
};
use crate::constants::HMAC_RESPONSE_LENGTH;
use crate::types::SecretKey;
use crate::{Error, Result};

type HmacSha1 = Hmac<Sha1>;
type Encryptor = cbc::Encryptor<Aes128>;
type Decryptor = cbc::Decryptor<Aes128>;

/// HMAC-SHA1 digest
pub type Digest = Zeroizing<[u8; HMAC_RESPONSE_LENGTH]>;
/// AES-128 wrapping key
pub type WrappingKey = Zeroizing<[u8; CIPHER_KEY_LENGTH]>;
/// Cipher initialisation vector
pub type Iv = [u8; CIPHER_BLOCK_LENGTH];
/// Challenge persisted alongside the wrapped secret
pub type Challenge = [u8; CHALLENGE_LENGTH];
/// Encrypted, zero-padded secret
pub type WrappedSecret = [u8; WRAPPED_SECRET_LENGTH];

/// Compute HMAC-SHA1 of `message` under `key`
pub fn compute_hmac(key: &[u8; SECRET_KEY_LENGTH], message: &[u8]) -> Result<Digest> {
    let mut mac = <HmacSha1 as Mac>::new_from_slice(key)
        .map_err(|_| Error::CryptoFailure("HMAC key rejected"))?;
    mac.update(message);

    let output = mac.finalize().into_bytes();
    let mut digest = Zeroizing::new([0u8; HMAC_RESPONSE_LENGTH]);
    digest.copy_from_slice(&output);
    Ok(digest)
}

/// Truncate an HMAC digest to an AES-128 key
pub fn derive_wrapping_key(digest: &[u8; HMAC_RESPONSE_LENGTH]) -> WrappingKey {
    let mut key = Zeroizing::new([0u8; CIPHER_KEY_LENGTH]);
    key.copy_from_slice(&digest[..CIPHER_KEY_LENGTH]);
    key
}

/// Zero-pad a secret to whole cipher blocks
pub fn pad_secret(secret: &SecretKey) -> Zeroizing<[u8; WRAPPED_SECRET_LENGTH]> {
    let mut padded = Zeroizing::new([0u8; WRAPPED_SECRET_LENGTH]);
    padded[..SECRET_KEY_LENGTH].copy_from_slice(secret.as_bytes());
    padded
}

/// Encrypt `secret` under the key derived from `challenge`
pub fn wrap(secret: &SecretKey, challenge: &Challenge, iv: &Iv) -> Result<WrappedSecret> {
    let digest = compute_hmac(secret.as_bytes(), challenge)?;
    let key = derive_wrapping_key(&digest);
    // Encrypted in place; only ciphertext leaves the zeroizing buffer
    let mut buffer = pad_secret(secret);
    Encryptor::new_from_slices(key.as_slice(), iv)
        .map_err(|_| Error::CryptoFailure("invalid cipher key or IV length"))?
        .encrypt_padded_mut::<NoPadding>(buffer.as_mut_slice(), WRAPPED_SECRET_LENGTH)
        .map_err(|_| Error::CryptoFailure("wrapped secret is not block aligned"))?;
    Ok(*buffer)
}

/// Decrypt a wrapped secret
///
/// A wrong key yields garbage rather than an error; the caller verifies the
/// result against the token.
pub fn unwrap(
    wrapped: &WrappedSecret,
    key: &[u8; CIPHER_KEY_LENGTH],
    iv: &Iv,
) -> Result<Zeroizing<[u8; WRAPPED_SECRET_LENGTH]>> {
    let mut plaintext = Zeroizing::new(*wrapped);
    Decryptor::new_from_slices(key, iv)
        .map_err(|_| Error::CryptoFailure("invalid cipher key or IV length"))?
        .decrypt_padded_mut::<NoPadding>(plaintext.as_mut_slice())
        .map_err(|_| Error::CryptoFailure("wrapped secret is not block aligned"))?;
    Ok(plaintext)
}

/// The secret held in the leading bytes of an unwrapped buffer
pub fn recover_secret(plaintext: &[u8; WRAPPED_SECRET_LENGTH]) -> SecretKey {
    let mut secret = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
    secret.copy_from_slice(&plaintext[..SECRET_KEY_LENGTH]);
    SecretKey::new(*secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "b6e3f555562c894b7af13b1db37f28deff3ea89b";

    fn secret() -> SecretKey {
        SecretKey::from_hex(SECRET).unwrap()
    }

    #[test]
    fn test_hmac_rfc2202() {
        let digest = compute_hmac(&[0x0b; 20], b"Hi There").unwrap();
        assert_eq!(
            hex::encode(digest.as_slice()),
            "b617318655057264e28bc0b6fb378c8ef146be00"
        );
    }

    #[test]
    fn test_hmac_demo_challenge() {
        let digest = compute_hmac(secret().as_bytes(), &[0x42, 0x13, 0x37, 0xCA, 0xFE]).unwrap();
        assert_eq!(
            hex::encode(digest.as_slice()),
            "23b385dfa3106aa446143d6d1a04aac1475e46ee"
        );
    }

    #[test]
    fn test_wrap_vector() {
        let wrapped = wrap(&secret(), &[0x00; CHALLENGE_LENGTH], &[0x01; CIPHER_BLOCK_LENGTH]).unwrap();
        assert_eq!(
            hex::encode(wrapped),
            "17cd1093349dc92de5462f825fb1dcab82d4b35167ac1bdb8213d9e4242c0421"
        );
    }

    #[test]
    fn test_wrap_returns_no_plaintext_block() {
        let padded = pad_secret(&secret());
        let wrapped = wrap(&secret(), &[0x00; CHALLENGE_LENGTH], &[0x01; CIPHER_BLOCK_LENGTH]).unwrap();
        for (plain, cipher) in padded
            .chunks(CIPHER_BLOCK_LENGTH)
            .zip(wrapped.chunks(CIPHER_BLOCK_LENGTH))
        {
            assert_ne!(plain, cipher);
        }
        // The padding block is all zeros in plaintext
        assert_ne!(&wrapped[SECRET_KEY_LENGTH..], &[0u8; 12]);
    }

    #[test]
    fn test_unwrap_with_token_response() {
        // What the token answers for the all-zero challenge
        let response: [u8; 20] = hex::decode("d0c8fdb1e299942f2de5481815d4720e69533e81")
            .unwrap()
            .try_into()
            .unwrap();
        let wrapped: WrappedSecret =
            hex::decode("17cd1093349dc92de5462f825fb1dcab82d4b35167ac1bdb8213d9e4242c0421")
                .unwrap()
                .try_into()
                .unwrap();

        let key = derive_wrapping_key(&response);
        let plaintext = unwrap(&wrapped, &key, &[0x01; CIPHER_BLOCK_LENGTH]).unwrap();
        assert_eq!(&plaintext[SECRET_KEY_LENGTH..], &[0u8; 12]);
        assert_eq!(recover_secret(&plaintext), secret());
    }

    #[test]
    fn test_wrap_round_trip() {
        let secret = SecretKey::new(*b"\x00\x11\x22\x33\x44\x55\x66\x77\x88\x99\xaa\xbb\xcc\xdd\xee\xff\x01\x02\x03\x04");
        let challenge = [0x5A; CHALLENGE_LENGTH];
        let iv = [0xC3; CIPHER_BLOCK_LENGTH];

        let wrapped = wrap(&secret, &challenge, &iv).unwrap();
        assert_ne!(&wrapped[..SECRET_KEY_LENGTH], secret.as_bytes().as_slice());

        let digest = compute_hmac(secret.as_bytes(), &challenge).unwrap();
        let plaintext = unwrap(&wrapped, &derive_wrapping_key(&digest), &iv).unwrap();
        assert_eq!(recover_secret(&plaintext), secret);
    }

    #[test]
    fn test_unwrap_with_wrong_key_is_garbage() {
        let wrapped = wrap(&secret(), &[0x00; CHALLENGE_LENGTH], &[0x01; CIPHER_BLOCK_LENGTH]).unwrap();
        let plaintext = unwrap(&wrapped, &[0xFF; CIPHER_KEY_LENGTH], &[0x01; CIPHER_BLOCK_LENGTH]).unwrap();
        assert_ne!(recover_secret(&plaintext), secret());
    }
}
