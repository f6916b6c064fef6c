//! HMAC-SHA1 challenge-response token authentication
//!
//! A secret shared with a hardware token's HMAC slot is kept on the host only
//! in wrapped form: AES-128-CBC encrypted under the token's response to a
//! stored challenge. Authenticating asks the token for that response, unwraps
//! the secret with it, checks the token's answer against the secret and then
//! re-wraps the secret under a fresh challenge, so a recorded exchange cannot
//! be replayed.
//!
//! The crate is layered:
//!
//! - [`Token`] speaks the applet's command set over a
//!   [`CardTransport`](ykhmac_apdu_core::CardTransport)
//! - [`crypto`] holds HMAC-SHA1 and the key wrap
//! - [`Lifecycle`] runs enrollment and authentication against a
//!   [`RandomSource`] and a [`PersistentStore`]
//!
//! [`SoftToken`] emulates a token in software.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

pub mod commands;
pub mod config;
pub mod constants;
pub mod crypto;
mod emulator;
mod error;
mod events;
mod lifecycle;
mod record;
mod rng;
mod storage;
mod token;
mod types;

pub use config::ProtocolConfig;
pub use emulator::SoftToken;
pub use error::{Error, Result};
pub use events::{Event, Observer};
pub use lifecycle::Lifecycle;
pub use record::CredentialRecord;
#[cfg(feature = "std")]
pub use rng::ThreadRandom;
pub use rng::RandomSource;
pub use storage::{ERASED_BYTE, MemoryStore, PersistentStore, RecordLayout, StoreError};
pub use token::Token;
pub use types::{DeviceResponse, SecretKey, Slot, SlotSet, Version};

pub use ykhmac_apdu_core::{CardTransport, ResponseOutcome, TransportError};
