//! Decoding of the two byte status trailer into a response outcome
//!
//! The mapping is fixed by the token's status word convention and must not
//! grow new arms: anything that is not one of the three known words is
//! [`ResponseOutcome::Unexpected`].

use derive_more::Display;

use super::status::{StatusWord, common};

/// Outcome of an exchange, derived purely from the trailing status bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ResponseOutcome {
    /// 90 00
    #[display("success")]
    Success,
    /// 69 85
    #[display("card not authenticated")]
    CardNotAuthenticated,
    /// 6A 82
    #[display("file not found")]
    FileNotFound,
    /// Any other status word, or a frame too short to carry one
    #[display("unexpected response")]
    Unexpected,
}

impl ResponseOutcome {
    /// Map a status word onto an outcome
    pub const fn from_status(status: StatusWord) -> Self {
        match (status.sw1, status.sw2) {
            (0x90, 0x00) => Self::Success,
            (0x69, 0x85) => Self::CardNotAuthenticated,
            (0x6A, 0x82) => Self::FileNotFound,
            _ => Self::Unexpected,
        }
    }

    /// Whether the outcome is [`ResponseOutcome::Success`]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Canonical status word for the outcome, if it has one
    pub const fn status_word(&self) -> Option<StatusWord> {
        match self {
            Self::Success => Some(common::SUCCESS),
            Self::CardNotAuthenticated => Some(common::CONDITIONS_NOT_SATISFIED),
            Self::FileNotFound => Some(common::FILE_NOT_FOUND),
            Self::Unexpected => None,
        }
    }
}

impl From<StatusWord> for ResponseOutcome {
    fn from(status: StatusWord) -> Self {
        Self::from_status(status)
    }
}

/// Decode the outcome of a raw response frame
///
/// Only the last two bytes are inspected. Frames shorter than two bytes are
/// [`ResponseOutcome::Unexpected`].
pub fn decode_status(frame: &[u8]) -> ResponseOutcome {
    match frame {
        [.., sw1, sw2] => ResponseOutcome::from_status(StatusWord::new(*sw1, *sw2)),
        _ => ResponseOutcome::Unexpected,
    }
}
