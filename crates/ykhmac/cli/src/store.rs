//! File-backed EEPROM image
//!
//! [`FileStore`] implements [`PersistentStore`] over a host file of fixed
//! size, so enrollments survive between simulator runs.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use ykhmac::{ERASED_BYTE, PersistentStore, StoreError};

/// Size of the simulated EEPROM
pub(crate) const EEPROM_SIZE: usize = 1024;

/// Simulates an EEPROM using a host file
#[derive(Debug)]
pub(crate) struct FileStore {
    file: File,
}

impl FileStore {
    /// Open the image at `path`, creating an erased one if it does not exist
    pub(crate) fn open(path: &Path) -> Result<Self, StoreError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(io_error)?;

        let file_len = file.metadata().map_err(io_error)?.len();
        if file_len == 0 {
            file.seek(SeekFrom::Start(0)).map_err(io_error)?;
            file.write_all(&[ERASED_BYTE; EEPROM_SIZE]).map_err(io_error)?;
            file.flush().map_err(io_error)?;
        } else if file_len != EEPROM_SIZE as u64 {
            return Err(StoreError::Io(format!(
                "invalid image size {file_len}, expected {EEPROM_SIZE}"
            )));
        }

        Ok(Self { file })
    }

    fn check_range(offset: usize, length: usize) -> Result<(), StoreError> {
        match offset.checked_add(length) {
            Some(end) if end <= EEPROM_SIZE => Ok(()),
            _ => Err(StoreError::OutOfBounds {
                offset,
                length,
                capacity: EEPROM_SIZE,
            }),
        }
    }
}

impl PersistentStore for FileStore {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        Self::check_range(offset, buf.len())?;
        self.file
            .seek(SeekFrom::Start(offset as u64))
            .map_err(io_error)?;
        self.file.read_exact(buf).map_err(io_error)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError> {
        Self::check_range(offset, data.len())?;
        self.file
            .seek(SeekFrom::Start(offset as u64))
            .map_err(io_error)?;
        self.file.write_all(data).map_err(io_error)?;
        self.file.sync_data().map_err(io_error)
    }
}

fn io_error(error: std::io::Error) -> StoreError {
    StoreError::Io(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DATA: &[u8] = &[0xee, 0xdd, 0xbb, 0x77];

    #[test]
    fn test_new_image_is_erased() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(&dir.path().join("eeprom.bin")).unwrap();

        let mut buf = [0u8; 4];
        store.read(EEPROM_SIZE - 4, &mut buf).unwrap();
        assert_eq!(buf, [ERASED_BYTE; 4]);
    }

    #[test]
    fn test_write_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eeprom.bin");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.write(1, DATA).unwrap();
        }

        let mut store = FileStore::open(&path).unwrap();
        let mut buf = [0u8; 6];
        store.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF, 0xee, 0xdd, 0xbb, 0x77, 0xFF]);
    }

    #[test]
    fn test_out_of_bounds() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(&dir.path().join("eeprom.bin")).unwrap();
        assert_eq!(
            store.write(EEPROM_SIZE - 2, DATA),
            Err(StoreError::OutOfBounds {
                offset: EEPROM_SIZE - 2,
                length: 4,
                capacity: EEPROM_SIZE
            })
        );
    }

    #[test]
    fn test_rejects_foreign_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eeprom.bin");
        std::fs::write(&path, [0u8; 10]).unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Io(_))));
    }
}
