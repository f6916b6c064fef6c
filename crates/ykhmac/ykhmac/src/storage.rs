//! Byte-addressable persistent store and the credential record layout

use crate::config::{CHALLENGE_LENGTH, CIPHER_BLOCK_LENGTH, RECORD_LENGTH};

/// Value of a byte that was never written, as on erased EEPROM
pub const ERASED_BYTE: u8 = 0xFF;

/// Error reported by a [`PersistentStore`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The range does not lie within the store
    #[error("Range {offset}..{offset}+{length} is outside a store of {capacity} bytes")]
    OutOfBounds {
        /// Start of the range
        offset: usize,
        /// Length of the range
        length: usize,
        /// Store capacity
        capacity: usize,
    },

    /// Implementation-specific failure of the backing medium
    #[error("Store I/O error: {0}")]
    Io(String),
}

/// Abstracts a byte-addressable persistent store
pub trait PersistentStore {
    /// Read `buf.len()` bytes starting at `offset`
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError>;

    /// Write `data` starting at `offset`
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError>;
}

impl<S: PersistentStore + ?Sized> PersistentStore for &mut S {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        (**self).read(offset, buf)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError> {
        (**self).write(offset, data)
    }
}

/// In-memory store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    data: Vec<u8>,
}

impl MemoryStore {
    /// Create an erased store of `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![ERASED_BYTE; capacity],
        }
    }

    /// Wrap existing contents
    pub const fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Full contents of the store
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Store capacity in bytes
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    fn range(&self, offset: usize, length: usize) -> Result<core::ops::Range<usize>, StoreError> {
        match offset.checked_add(length) {
            Some(end) if end <= self.data.len() => Ok(offset..end),
            _ => Err(StoreError::OutOfBounds {
                offset,
                length,
                capacity: self.data.len(),
            }),
        }
    }
}

impl PersistentStore for MemoryStore {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError> {
        let range = self.range(offset, data.len())?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }
}

/// Position of the credential record within a store
///
/// Fields are laid out back to back from `base`: the challenge, the IV and
/// the wrapped secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordLayout {
    base: usize,
}

impl RecordLayout {
    /// Layout starting at `base`
    pub const fn at(base: usize) -> Self {
        Self { base }
    }

    /// First byte of the record
    pub const fn base(&self) -> usize {
        self.base
    }

    /// Offset of the challenge
    pub const fn challenge_offset(&self) -> usize {
        self.base
    }

    /// Offset of the IV
    pub const fn iv_offset(&self) -> usize {
        self.base + CHALLENGE_LENGTH
    }

    /// Offset of the wrapped secret
    pub const fn wrapped_offset(&self) -> usize {
        self.base + CHALLENGE_LENGTH + CIPHER_BLOCK_LENGTH
    }

    /// One past the last byte of the record
    pub const fn end(&self) -> usize {
        self.base + RECORD_LENGTH
    }
}
