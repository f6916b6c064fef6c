use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::{CHALLENGE_LENGTH, CIPHER_BLOCK_LENGTH, RECORD_LENGTH, WRAPPED_SECRET_LENGTH};
use crate::crypto::{Challenge, Iv, WrappedSecret};
use crate::storage::{PersistentStore, RecordLayout};
use crate::{Error, Result};

/// Persisted credential: challenge, IV and the wrapped secret
///
/// The wrapped secret is only recoverable with the token's response to the
/// challenge, so the record is safe at rest. It is still wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CredentialRecord {
    /// Challenge the wrapping key is derived from
    pub challenge: Challenge,
    /// IV of the wrapped secret
    pub iv: Iv,
    /// Encrypted, zero-padded secret
    pub wrapped: WrappedSecret,
}

impl CredentialRecord {
    /// Assemble a record from its fields
    pub const fn new(challenge: Challenge, iv: Iv, wrapped: WrappedSecret) -> Self {
        Self {
            challenge,
            iv,
            wrapped,
        }
    }

    /// Read the record stored at `layout`
    pub fn load<S: PersistentStore + ?Sized>(store: &mut S, layout: &RecordLayout) -> Result<Self> {
        let mut record = Self::new(
            [0u8; CHALLENGE_LENGTH],
            [0u8; CIPHER_BLOCK_LENGTH],
            [0u8; WRAPPED_SECRET_LENGTH],
        );
        read_field(store, layout.challenge_offset(), &mut record.challenge)?;
        read_field(store, layout.iv_offset(), &mut record.iv)?;
        read_field(store, layout.wrapped_offset(), &mut record.wrapped)?;
        debug!(base = layout.base(), "Loaded credential record");
        Ok(record)
    }

    /// Write the record at `layout`, verifying each field by reading it back
    ///
    /// The fields are written in layout order. A failure leaves the fields
    /// already written in place.
    pub fn persist<S: PersistentStore + ?Sized>(
        &self,
        store: &mut S,
        layout: &RecordLayout,
    ) -> Result<()> {
        write_field(store, layout.challenge_offset(), &self.challenge)?;
        write_field(store, layout.iv_offset(), &self.iv)?;
        write_field(store, layout.wrapped_offset(), &self.wrapped)?;
        debug!(base = layout.base(), "Persisted credential record");
        Ok(())
    }

    /// Serialized form, in layout order
    pub fn to_bytes(&self) -> Zeroizing<[u8; RECORD_LENGTH]> {
        let mut bytes = Zeroizing::new([0u8; RECORD_LENGTH]);
        bytes[..CHALLENGE_LENGTH].copy_from_slice(&self.challenge);
        bytes[CHALLENGE_LENGTH..CHALLENGE_LENGTH + CIPHER_BLOCK_LENGTH].copy_from_slice(&self.iv);
        bytes[CHALLENGE_LENGTH + CIPHER_BLOCK_LENGTH..].copy_from_slice(&self.wrapped);
        bytes
    }
}

impl core::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("challenge", &hex::encode(self.challenge))
            .field("iv", &hex::encode(self.iv))
            .finish_non_exhaustive()
    }
}

fn read_field<S: PersistentStore + ?Sized>(store: &mut S, offset: usize, buf: &mut [u8]) -> Result<()> {
    store.read(offset, buf).map_err(|e| {
        warn!(offset, length = buf.len(), error = %e, "Store read failed");
        Error::StorageReadFailure {
            offset,
            length: buf.len(),
        }
    })
}

fn write_field<S: PersistentStore + ?Sized>(store: &mut S, offset: usize, data: &[u8]) -> Result<()> {
    let failure = Error::StorageWriteFailure {
        offset,
        length: data.len(),
    };

    if let Err(e) = store.write(offset, data) {
        warn!(offset, length = data.len(), error = %e, "Store write failed");
        return Err(failure);
    }

    let mut readback = Zeroizing::new(vec![0u8; data.len()]);
    if let Err(e) = store.read(offset, &mut readback) {
        warn!(offset, length = data.len(), error = %e, "Store read-back failed");
        return Err(failure);
    }
    if readback.as_slice() != data {
        warn!(offset, length = data.len(), "Store read-back mismatch");
        return Err(failure);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StoreError};

    fn sample() -> CredentialRecord {
        CredentialRecord::new([0x11; 32], [0x22; 16], [0x33; 32])
    }

    #[test]
    fn test_persist_and_load() {
        let mut store = MemoryStore::new(81);
        let layout = RecordLayout::at(1);
        sample().persist(&mut store, &layout).unwrap();

        assert_eq!(store.as_bytes()[0], 0xFF);
        assert_eq!(&store.as_bytes()[1..], sample().to_bytes().as_slice());
        assert_eq!(CredentialRecord::load(&mut store, &layout).unwrap(), sample());
    }

    #[test]
    fn test_load_outside_store() {
        let mut store = MemoryStore::new(40);
        assert_eq!(
            CredentialRecord::load(&mut store, &RecordLayout::default()),
            Err(Error::StorageReadFailure {
                offset: 32,
                length: 16
            })
        );
    }

    /// Store that silently drops writes past a given offset
    struct LossyStore {
        inner: MemoryStore,
        limit: usize,
    }

    impl PersistentStore for LossyStore {
        fn read(&mut self, offset: usize, buf: &mut [u8]) -> core::result::Result<(), StoreError> {
            self.inner.read(offset, buf)
        }

        fn write(&mut self, offset: usize, data: &[u8]) -> core::result::Result<(), StoreError> {
            if offset >= self.limit {
                return Ok(());
            }
            self.inner.write(offset, data)
        }
    }

    #[test]
    fn test_persist_detects_readback_mismatch() {
        let mut store = LossyStore {
            inner: MemoryStore::new(80),
            limit: 48,
        };
        assert_eq!(
            sample().persist(&mut store, &RecordLayout::default()),
            Err(Error::StorageWriteFailure {
                offset: 48,
                length: 32
            })
        );
    }

    #[test]
    fn test_debug_omits_wrapped_secret() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("challenge"));
        assert!(!debug.contains("wrapped"));
    }
}
