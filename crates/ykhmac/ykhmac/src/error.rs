use ykhmac_apdu_core::{ResponseOutcome, StatusWord, TransportError};

/// Result type for ykhmac operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ykhmac operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Input rejected locally, before anything reached the token
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The transport collaborator failed
    #[error("Transport failure: {0}")]
    TransportFailure(#[from] TransportError),

    /// The token answered with a status other than success
    #[error("Token reported {outcome}{}", status_suffix(.status))]
    ProtocolStatus {
        /// Decoded outcome
        outcome: ResponseOutcome,
        /// Raw status word, absent for frames too short to carry one
        status: Option<StatusWord>,
    },

    /// Successful response with less payload than the command returns
    #[error("Response too short: expected {expected} bytes, got {actual}")]
    ResponseTooShort {
        /// Required payload length
        expected: usize,
        /// Received payload length
        actual: usize,
    },

    /// HMAC or AES computation could not complete
    #[error("Crypto failure: {0}")]
    CryptoFailure(&'static str),

    /// The persistent store could not be read
    #[error("Storage read failure at offset {offset} ({length} bytes)")]
    StorageReadFailure {
        /// Absolute offset of the failed read
        offset: usize,
        /// Length of the failed read
        length: usize,
    },

    /// A write to the persistent store failed or did not read back
    #[error("Storage write failure at offset {offset} ({length} bytes)")]
    StorageWriteFailure {
        /// Absolute offset of the failed write
        offset: usize,
        /// Length of the failed write
        length: usize,
    },

    /// The token's response did not match the enrolled credential
    #[error("Verification denied")]
    VerificationDenied,
}

fn status_suffix(status: &Option<StatusWord>) -> String {
    status.map(|sw| format!(" ({sw})")).unwrap_or_default()
}

impl Error {
    /// Create a protocol status error from a status word
    pub const fn status(status: StatusWord) -> Self {
        Self::ProtocolStatus {
            outcome: ResponseOutcome::from_status(status),
            status: Some(status),
        }
    }

    /// Whether this is a verification denial rather than a fault
    pub const fn is_denial(&self) -> bool {
        matches!(self, Self::VerificationDenied)
    }

    /// Whether the exchange with the token failed
    pub const fn is_device_failure(&self) -> bool {
        matches!(
            self,
            Self::TransportFailure(_) | Self::ProtocolStatus { .. } | Self::ResponseTooShort { .. }
        )
    }

    /// The decoded outcome carried by this error, if any
    pub const fn outcome(&self) -> Option<ResponseOutcome> {
        match self {
            Self::ProtocolStatus { outcome, .. } => Some(*outcome),
            Self::ResponseTooShort { .. } => Some(ResponseOutcome::Unexpected),
            _ => None,
        }
    }
}

impl From<ykhmac_apdu_core::Error> for Error {
    fn from(error: ykhmac_apdu_core::Error) -> Self {
        match error {
            ykhmac_apdu_core::Error::Transport(e) => Self::TransportFailure(e),
            ykhmac_apdu_core::Error::PayloadTooLong { .. } => {
                Self::InvalidArgument("command payload exceeds the transfer buffer")
            }
            ykhmac_apdu_core::Error::InvalidCommandLength(_) => {
                Self::InvalidArgument("malformed command frame")
            }
            ykhmac_apdu_core::Error::IncompleteResponse(_) => Self::ProtocolStatus {
                outcome: ResponseOutcome::Unexpected,
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        assert_eq!(
            Error::from(ykhmac_apdu_core::Error::IncompleteResponse(1)),
            Error::ProtocolStatus {
                outcome: ResponseOutcome::Unexpected,
                status: None
            }
        );
        assert!(matches!(
            Error::from(ykhmac_apdu_core::Error::payload_too_long(60, 57)),
            Error::InvalidArgument(_)
        ));
        assert_eq!(
            Error::from(ykhmac_apdu_core::Error::Transport(TransportError::Timeout)),
            Error::TransportFailure(TransportError::Timeout)
        );
    }

    #[test]
    fn test_classification() {
        let status = Error::status(StatusWord::new(0x69, 0x85));
        assert!(status.is_device_failure());
        assert_eq!(status.outcome(), Some(ResponseOutcome::CardNotAuthenticated));
        assert_eq!(
            status.to_string(),
            "Token reported card not authenticated (69 85)"
        );

        assert!(Error::VerificationDenied.is_denial());
        assert!(!Error::VerificationDenied.is_device_failure());
        assert!(!Error::CryptoFailure("x").is_denial());
    }
}
