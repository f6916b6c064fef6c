//! Structured lifecycle events
//!
//! Events describe what the lifecycle did, never the key material it did it
//! with. They are delivered to an [`Observer`] in addition to the `tracing`
//! output.

use ykhmac_apdu_core::ResponseOutcome;

use crate::types::Slot;

/// Lifecycle step reported to an observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A fresh challenge and IV were drawn from the random source
    ChallengeDrawn,
    /// The credential record was read from the store
    RecordLoaded,
    /// A challenge-response exchange is about to start
    ExchangeAttempted {
        /// Slot being queried
        slot: Slot,
    },
    /// A challenge-response exchange finished
    ExchangeCompleted {
        /// Slot that was queried
        slot: Slot,
        /// Decoded outcome, `None` when the transport failed
        outcome: Option<ResponseOutcome>,
    },
    /// The token response was checked against the unwrapped secret
    VerificationResult {
        /// Whether the token proved possession of the secret
        matched: bool,
    },
    /// A new credential record was written and verified
    RecordPersisted,
}

/// Receiver of lifecycle events
pub trait Observer {
    /// Called once per event, in order
    fn on_event(&mut self, event: &Event);
}

impl<F: FnMut(&Event)> Observer for F {
    fn on_event(&mut self, event: &Event) {
        self(event)
    }
}
