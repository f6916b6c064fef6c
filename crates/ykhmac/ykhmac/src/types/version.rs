use derive_more::Display;

use crate::{Error, Result};

/// Firmware version reported by the token status block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[display("{major}.{minor}.{build}")]
pub struct Version {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Build number
    pub build: u8,
}

impl Version {
    /// Create a version from its three components
    pub const fn new(major: u8, minor: u8, build: u8) -> Self {
        Self {
            major,
            minor,
            build,
        }
    }

    /// Raw bytes in wire order
    pub const fn to_bytes(&self) -> [u8; 3] {
        [self.major, self.minor, self.build]
    }
}

impl From<[u8; 3]> for Version {
    fn from(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }
}

impl TryFrom<&[u8]> for Version {
    type Error = Error;

    fn try_from(payload: &[u8]) -> Result<Self> {
        match payload {
            [major, minor, build, ..] => Ok(Self::new(*major, *minor, *build)),
            _ => Err(Error::ResponseTooShort {
                expected: 3,
                actual: payload.len(),
            }),
        }
    }
}
