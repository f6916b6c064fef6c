//! Token API against stub and emulated transports

mod common;

use common::*;
use ykhmac::constants::{FIDESMO_AID, YUBIKEY_AID};
use ykhmac::{Error, ResponseOutcome, Slot, SlotSet, SoftToken, Token, TransportError, Version};
use ykhmac_apdu_core::{Bytes, CardTransport, RECV_BUFFER_SIZE};

#[test]
fn test_find_slots_with_slot2_only() {
    let mut token = Token::new(Canned::slot2_only());
    let slots = token.find_slots();

    assert!(!slots.contains(Slot::Slot1));
    assert!(slots.contains(Slot::Slot2));
    assert_eq!(slots.bits(), 0x02);

    let probe = "084242424242424242";
    assert_eq!(
        token.transport().commands,
        vec![
            hex::decode(format!("00013000{probe}")).unwrap(),
            hex::decode(format!("00013800{probe}")).unwrap(),
        ]
    );
}

#[test]
fn test_find_slots_on_emulated_token() {
    let mut token = selected(demo_token(Slot::Slot1));
    assert_eq!(token.find_slots(), [Slot::Slot1].into_iter().collect::<SlotSet>());

    token.transport_mut().configure_slot(Slot::Slot2, Some(demo_secret()));
    assert_eq!(token.find_slots().bits(), 0x03);

    token.transport_mut().configure_slot(Slot::Slot1, None);
    token.transport_mut().configure_slot(Slot::Slot2, None);
    assert!(token.find_slots().is_empty());
}

#[test]
fn test_serial_and_version() {
    let mut token = selected(demo_token(Slot::Slot1));
    assert_eq!(token.read_serial().unwrap(), 1_234_567);
    assert_eq!(token.read_version().unwrap(), Version::new(5, 4, 3));
}

#[test]
fn test_select_unknown_applet() {
    let mut token = Token::new(demo_token(Slot::Slot1));
    let err = token.select(FIDESMO_AID).unwrap_err();
    assert_eq!(err.outcome(), Some(ResponseOutcome::FileNotFound));

    let mut token = Token::new(demo_token(Slot::Slot1).with_aid(FIDESMO_AID));
    token.select(FIDESMO_AID).unwrap();
    assert!(token.transport().is_selected());
    assert!(token.select(YUBIKEY_AID).is_err());
}

#[test]
fn test_demo_challenge_response() {
    let mut token = selected(demo_token(Slot::Slot2));
    let response = token
        .exchange_hmac(Slot::Slot2, &[0x42, 0x13, 0x37, 0xCA, 0xFE])
        .unwrap();
    assert_eq!(
        hex::encode(response.as_bytes()),
        "23b385dfa3106aa446143d6d1a04aac1475e46ee"
    );
    assert!(token.probe_slot(Slot::Slot2));
    assert!(!token.probe_slot(Slot::Slot1));
}

#[test]
fn test_input_bounds_never_reach_transport() {
    let mut token = Token::new(Recording::new(demo_token(Slot::Slot1)));

    assert!(matches!(
        token.select(&[0xA0; 33]),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        token.exchange_hmac(Slot::Slot1, &[0x00; 58]),
        Err(Error::InvalidArgument(_))
    ));
    assert!(token.transport().commands.is_empty());

    // The largest challenge still fits
    token.select(YUBIKEY_AID).unwrap();
    token.exchange_hmac(Slot::Slot1, &[0x00; 57]).unwrap();
    assert_eq!(token.transport().commands[1].len(), 62);
}

#[test]
fn test_short_hmac_response() {
    let mut short = vec![0xAB; 19];
    short.extend_from_slice(&[0x90, 0x00]);
    let mut token = Token::new(Canned::new(&short, &[0x62, 0x00]));

    let err = token.exchange_hmac(Slot::Slot1, &[0x00; 32]).unwrap_err();
    assert_eq!(
        err,
        Error::ResponseTooShort {
            expected: 20,
            actual: 19
        }
    );
    assert!(err.is_device_failure());
    assert_eq!(token.last_outcome(), Some(ResponseOutcome::Success));

    let err = token.exchange_hmac(Slot::Slot2, &[0x00; 32]).unwrap_err();
    assert_eq!(err.outcome(), Some(ResponseOutcome::Unexpected));
    assert_eq!(token.last_outcome(), Some(ResponseOutcome::Unexpected));
}

#[test]
fn test_truncated_frame_is_unexpected() {
    let mut token = Token::new(Canned::new(&[0x90], &[]));
    let err = token.exchange_hmac(Slot::Slot1, &[0x00; 8]).unwrap_err();
    assert_eq!(
        err,
        Error::ProtocolStatus {
            outcome: ResponseOutcome::Unexpected,
            status: None
        }
    );
    assert_eq!(token.last_outcome(), Some(ResponseOutcome::Unexpected));
}

/// Transport answering with more bytes than the receive buffer holds
#[derive(Debug)]
struct Oversized;

impl CardTransport for Oversized {
    fn do_transmit_raw(&mut self, _command: &[u8]) -> Result<Bytes, TransportError> {
        let mut frame = vec![0x00; RECV_BUFFER_SIZE - 1];
        frame.extend_from_slice(&[0x90, 0x00]);
        Ok(Bytes::from(frame))
    }
}

#[test]
fn test_receive_buffer_overflow() {
    let mut token = Token::new(Oversized);
    assert_eq!(
        token.read_serial(),
        Err(Error::TransportFailure(TransportError::BufferTooSmall {
            length: RECV_BUFFER_SIZE + 1,
            capacity: RECV_BUFFER_SIZE
        }))
    );
    assert_eq!(token.last_outcome(), None);
}

#[test]
fn test_soft_token_requires_selection() {
    let mut token = Token::new(SoftToken::new(7, Version::new(4, 3, 5)));
    let err = token.read_serial().unwrap_err();
    assert_eq!(err.outcome(), Some(ResponseOutcome::CardNotAuthenticated));
}
