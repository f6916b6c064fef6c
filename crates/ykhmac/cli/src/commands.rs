//! Command handlers
//!
//! Byte 0 of the store marks the enrollment; the credential record follows
//! it.

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};
use ykhmac::constants::YUBIKEY_AID;
use ykhmac::crypto::compute_hmac;
use ykhmac::{
    Lifecycle, PersistentStore, RecordLayout, SecretKey, Slot, SoftToken, ThreadRandom, Token,
    Version,
};

/// Offset of the enrollment flag
const ENROLLMENT_FLAG_OFFSET: usize = 0;
/// Flag value of an enrolled store
const ENROLLED: u8 = 1;
/// Flag value written by `forget`
const NOT_ENROLLED: u8 = 0;
/// The record starts right after the flag
const RECORD_LAYOUT: RecordLayout = RecordLayout::at(ENROLLMENT_FLAG_OFFSET + 1);

/// Challenge used by the demo challenge-response
pub(crate) const DEMO_CHALLENGE: &str = "421337cafe";

/// Whether the store holds an enrollment
pub(crate) fn is_enrolled<S: PersistentStore>(store: &mut S) -> Result<bool> {
    let mut flag = [0u8; 1];
    store
        .read(ENROLLMENT_FLAG_OFFSET, &mut flag)
        .context("Failed to read enrollment flag")?;
    Ok(flag[0] == ENROLLED)
}

fn set_enrolled<S: PersistentStore>(store: &mut S, enrolled: bool) -> Result<()> {
    let flag = if enrolled { ENROLLED } else { NOT_ENROLLED };
    store
        .write(ENROLLMENT_FLAG_OFFSET, &[flag])
        .context("Failed to write enrollment flag")
}

/// Select the applet on the emulated token
fn select_token(token: &mut SoftToken) -> Result<Token<&mut SoftToken>> {
    let mut token = Token::new(token);
    token.select(YUBIKEY_AID).context("Select error")?;
    debug!("Select OK");
    Ok(token)
}

/// Enroll `secret` unless the store already holds an enrollment
pub(crate) fn enroll_command<S: PersistentStore>(
    store: &mut S,
    token: &mut SoftToken,
    secret: &SecretKey,
) -> Result<()> {
    if is_enrolled(store)? {
        bail!("A key is already enrolled, run `forget` first");
    }

    let mut lifecycle =
        Lifecycle::new(Token::new(token), ThreadRandom, &mut *store).with_layout(RECORD_LAYOUT);
    lifecycle.enroll(secret).context("Enrollment failed")?;
    // Release the store before touching the flag
    drop(lifecycle);

    set_enrolled(store, true)?;
    info!("Key enrolled");
    println!("Key enrolled");
    Ok(())
}

/// Authenticate the token on `slot` and rotate the stored credential
pub(crate) fn authenticate_command<S: PersistentStore>(
    store: &mut S,
    token: &mut SoftToken,
    slot: Slot,
) -> Result<()> {
    if !is_enrolled(store)? {
        bail!("No key enrolled, run `enroll` first");
    }

    let token = select_token(token)?;
    let mut lifecycle = Lifecycle::new(token, ThreadRandom, &mut *store).with_layout(RECORD_LAYOUT);
    match lifecycle.authenticate(slot) {
        Ok(()) => {
            println!("Access granted :)");
            Ok(())
        }
        Err(e) if e.is_denial() => {
            warn!(%slot, "Access denied");
            bail!("Access denied :(")
        }
        Err(e) => Err(e).context("Communication error"),
    }
}

/// Invalidate the enrollment
pub(crate) fn forget_command<S: PersistentStore>(store: &mut S) -> Result<()> {
    set_enrolled(store, false)?;
    println!("Invalidating enrollment");
    Ok(())
}

/// Print serial, version and the configured slots
pub(crate) fn scan_command(token: &mut SoftToken, secrets: &SlotSecrets) -> Result<()> {
    let mut token = select_token(token)?;

    let serial = token.read_serial().context("Read serial error")?;
    println!("Serial number: {serial}");
    let version = token.read_version().context("Read version error")?;
    println!("Firmware version: {version}");

    let slots = token.find_slots();
    if slots.is_empty() {
        println!("No slots configured");
        return Ok(());
    }
    let challenge = hex::decode(DEMO_CHALLENGE)?;
    for slot in slots.iter() {
        println!("Slot {slot} configured");
        challenge_response(&mut token, slot, &challenge, secrets.get(slot))?;
    }
    Ok(())
}

/// Run one challenge-response on `slot`
pub(crate) fn chalresp_command(
    token: &mut SoftToken,
    secrets: &SlotSecrets,
    slot: Slot,
    challenge: &str,
) -> Result<()> {
    let challenge = hex::decode(challenge).context("Challenge is not valid hex")?;
    let mut token = select_token(token)?;
    challenge_response(&mut token, slot, &challenge, secrets.get(slot))
}

fn challenge_response(
    token: &mut Token<&mut SoftToken>,
    slot: Slot,
    challenge: &[u8],
    secret: Option<&SecretKey>,
) -> Result<()> {
    println!("Challenge: {}", hex::encode(challenge));
    let response = token
        .exchange_hmac(slot, challenge)
        .context("Challenge-response error")?;
    println!("Response: {}", hex::encode(response.as_bytes()));

    if let Some(secret) = secret {
        let computed = compute_hmac(secret.as_bytes(), challenge)?;
        println!("Computed: {}", hex::encode(computed.as_slice()));
    }
    Ok(())
}

/// Secrets programmed into the emulated token, by slot
#[derive(Debug, Default)]
pub(crate) struct SlotSecrets {
    slot1: Option<SecretKey>,
    slot2: Option<SecretKey>,
}

impl SlotSecrets {
    /// Parse the hex secrets given on the command line
    pub(crate) fn parse(slot1: Option<&str>, slot2: Option<&str>) -> Result<Self> {
        let parse = |input: Option<&str>, slot: Slot| {
            input
                .map(SecretKey::from_hex)
                .transpose()
                .with_context(|| format!("Invalid secret for slot {slot}"))
        };
        Ok(Self {
            slot1: parse(slot1, Slot::Slot1)?,
            slot2: parse(slot2, Slot::Slot2)?,
        })
    }

    /// Secret of `slot`, if programmed
    pub(crate) const fn get(&self, slot: Slot) -> Option<&SecretKey> {
        match slot {
            Slot::Slot1 => self.slot1.as_ref(),
            Slot::Slot2 => self.slot2.as_ref(),
        }
    }

    /// Emulated token with these secrets programmed
    pub(crate) fn token(&self, serial: u32) -> SoftToken {
        let mut token = SoftToken::new(serial, Version::new(5, 4, 3));
        for slot in Slot::ALL {
            token.configure_slot(slot, self.get(slot).cloned());
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ykhmac::MemoryStore;

    const SECRET: &str = "b6e3f555562c894b7af13b1db37f28deff3ea89b";

    fn secrets() -> SlotSecrets {
        SlotSecrets::parse(Some(SECRET), None).unwrap()
    }

    #[test]
    fn test_enroll_authenticate_forget() {
        let mut store = MemoryStore::new(128);
        let mut token = secrets().token(1);
        let secret = SecretKey::from_hex(SECRET).unwrap();

        assert!(!is_enrolled(&mut store).unwrap());
        assert!(authenticate_command(&mut store, &mut token, Slot::Slot1).is_err());

        enroll_command(&mut store, &mut token, &secret).unwrap();
        assert!(is_enrolled(&mut store).unwrap());
        assert!(enroll_command(&mut store, &mut token, &secret).is_err());

        let before = store.as_bytes().to_vec();
        authenticate_command(&mut store, &mut token, Slot::Slot1).unwrap();
        assert_eq!(store.as_bytes()[0], ENROLLED);
        assert_ne!(store.as_bytes(), before.as_slice());

        forget_command(&mut store).unwrap();
        assert!(!is_enrolled(&mut store).unwrap());
        enroll_command(&mut store, &mut token, &secret).unwrap();
    }

    #[test]
    fn test_wrong_token_is_denied() {
        let mut store = MemoryStore::new(128);
        let mut token = secrets().token(1);
        enroll_command(&mut store, &mut token, &SecretKey::new([0x11; 20])).unwrap();

        let before = store.as_bytes().to_vec();
        let err = authenticate_command(&mut store, &mut token, Slot::Slot1).unwrap_err();
        assert_eq!(err.to_string(), "Access denied :(");
        assert_eq!(store.as_bytes(), before.as_slice());
    }

    #[test]
    fn test_unconfigured_slot_is_communication_error() {
        let mut store = MemoryStore::new(128);
        let mut token = secrets().token(1);
        enroll_command(&mut store, &mut token, &SecretKey::from_hex(SECRET).unwrap()).unwrap();

        let err = authenticate_command(&mut store, &mut token, Slot::Slot2).unwrap_err();
        assert_eq!(err.to_string(), "Communication error");
        assert!(err.downcast_ref::<ykhmac::Error>().is_some_and(|e| e.is_device_failure()));
    }

    #[test]
    fn test_scan_and_chalresp() {
        let secrets = secrets();
        let mut token = secrets.token(1_234_567);
        scan_command(&mut token, &secrets).unwrap();
        chalresp_command(&mut token, &secrets, Slot::Slot1, DEMO_CHALLENGE).unwrap();
        assert!(chalresp_command(&mut token, &secrets, Slot::Slot2, DEMO_CHALLENGE).is_err());
        assert!(chalresp_command(&mut token, &secrets, Slot::Slot1, "xyz").is_err());
    }

    #[test]
    fn test_invalid_slot_secret() {
        assert!(SlotSecrets::parse(Some("abc"), None).is_err());
        assert!(SlotSecrets::parse(None, Some("zz")).is_err());
        assert!(SlotSecrets::parse(None, None).unwrap().get(Slot::Slot1).is_none());
    }
}
