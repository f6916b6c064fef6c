//! Credential lifecycle
//!
//! [`Lifecycle`] owns the token, the random source and the store, and runs
//! the two operations of the scheme:
//!
//! - **enroll** draws a fresh challenge and IV, wraps the secret under
//!   `HMAC-SHA1(secret, challenge)` and persists the record;
//! - **authenticate** asks the token for `HMAC-SHA1(secret, challenge)`,
//!   unwraps the secret with it, checks the token's answer against the
//!   unwrapped secret and, on a match, enrolls the secret again so the stored
//!   challenge never repeats.
//!
//! The plaintext secret only ever exists in zeroize-on-drop buffers, so it is
//! wiped on every exit path, early returns included.

use core::fmt;

use tracing::{debug, info, trace, warn};
use ykhmac_apdu_core::CardTransport;
use zeroize::Zeroizing;

use crate::config::{CHALLENGE_LENGTH, CIPHER_BLOCK_LENGTH};
use crate::crypto::{self, Challenge};
use crate::events::{Event, Observer};
use crate::record::CredentialRecord;
use crate::rng::RandomSource;
use crate::storage::{PersistentStore, RecordLayout};
use crate::token::Token;
use crate::types::{SecretKey, Slot};
use crate::{Error, Result};

/// Enrollment and authentication over one token, random source and store
pub struct Lifecycle<T: CardTransport, R: RandomSource, S: PersistentStore> {
    token: Token<T>,
    rng: R,
    store: S,
    layout: RecordLayout,
    observer: Option<Box<dyn Observer>>,
}

impl<T, R, S> Lifecycle<T, R, S>
where
    T: CardTransport,
    R: RandomSource,
    S: PersistentStore,
{
    /// Create a lifecycle with the record at the start of the store
    pub fn new(token: Token<T>, rng: R, store: S) -> Self {
        Self {
            token,
            rng,
            store,
            layout: RecordLayout::default(),
            observer: None,
        }
    }

    /// Place the record elsewhere in the store
    pub fn with_layout(mut self, layout: RecordLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Deliver lifecycle events to `observer`
    pub fn set_observer(&mut self, observer: impl Observer + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Layout of the persisted record
    pub const fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Get a reference to the token
    pub const fn token(&self) -> &Token<T> {
        &self.token
    }

    /// Get a mutable reference to the token
    pub const fn token_mut(&mut self) -> &mut Token<T> {
        &mut self.token
    }

    /// Get a reference to the store
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Get a mutable reference to the store
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the lifecycle and return its collaborators
    pub fn into_parts(self) -> (Token<T>, R, S) {
        (self.token, self.rng, self.store)
    }

    /// Challenge of the currently persisted record
    pub fn stored_challenge(&mut self) -> Result<Challenge> {
        let record = CredentialRecord::load(&mut self.store, &self.layout)?;
        Ok(record.challenge)
    }

    /// Wrap `secret` under a fresh challenge and persist it
    ///
    /// Nothing is written unless wrapping succeeded. A storage failure can
    /// leave the record partially written; the previous enrollment is then
    /// no longer usable.
    pub fn enroll(&mut self, secret: &SecretKey) -> Result<()> {
        let mut challenge = Zeroizing::new([0u8; CHALLENGE_LENGTH]);
        let mut iv = Zeroizing::new([0u8; CIPHER_BLOCK_LENGTH]);
        self.rng.fill(challenge.as_mut_slice());
        self.rng.fill(iv.as_mut_slice());
        self.emit(Event::ChallengeDrawn);

        let wrapped = crypto::wrap(secret, &challenge, &iv)?;
        let record = CredentialRecord::new(*challenge, *iv, wrapped);
        record.persist(&mut self.store, &self.layout)?;
        self.emit(Event::RecordPersisted);

        info!(base = self.layout.base(), "Credential enrolled");
        Ok(())
    }

    /// Verify the token on `slot` against the enrolled credential
    ///
    /// On success the credential is re-enrolled under a fresh challenge, and
    /// `Ok` is only returned once that record is persisted. Device failures
    /// and [`Error::VerificationDenied`] leave the stored record untouched.
    pub fn authenticate(&mut self, slot: Slot) -> Result<()> {
        let record = CredentialRecord::load(&mut self.store, &self.layout)?;
        self.emit(Event::RecordLoaded);

        self.emit(Event::ExchangeAttempted { slot });
        let exchange = self.token.exchange_hmac(slot, &record.challenge);
        self.emit(Event::ExchangeCompleted {
            slot,
            outcome: self.token.last_outcome(),
        });
        let response = exchange.inspect_err(|e| {
            warn!(%slot, error = %e, "Challenge-response with token failed");
        })?;

        let key = crypto::derive_wrapping_key(response.as_bytes());
        let plaintext = crypto::unwrap(&record.wrapped, &key, &record.iv)?;
        let candidate = crypto::recover_secret(&plaintext);
        let expected = crypto::compute_hmac(candidate.as_bytes(), &record.challenge)?;

        let matched = response.matches(&expected);
        self.emit(Event::VerificationResult { matched });
        if !matched {
            warn!(%slot, "Token response does not match the enrolled credential");
            return Err(Error::VerificationDenied);
        }

        debug!(%slot, "Token verified, rotating credential");
        self.enroll(&candidate)
    }

    fn emit(&mut self, event: Event) {
        trace!(?event, "Lifecycle event");
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(&event);
        }
    }
}

impl<T, R, S> fmt::Debug for Lifecycle<T, R, S>
where
    T: CardTransport,
    R: RandomSource,
    S: PersistentStore,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("token", &self.token)
            .field("layout", &self.layout)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
