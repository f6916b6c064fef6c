//! Utility functions for APDU response handling

use tracing::debug;

use crate::response::status::StatusWord;
use crate::{Error, Result};

/// Extract status word (SW1, SW2) and payload from raw APDU response data
///
/// Returns a tuple containing:
/// - The status word as a tuple (SW1, SW2)
/// - The payload data (without the status word)
///
/// # Errors
/// Returns an error if the data is too short to contain a valid status word.
pub fn extract_response_parts(data: &[u8]) -> Result<((u8, u8), &[u8])> {
    match data {
        [payload @ .., sw1, sw2] => Ok(((*sw1, *sw2), payload)),
        _ => {
            debug!("Response too short: {} bytes", data.len());
            Err(Error::IncompleteResponse(data.len()))
        }
    }
}

/// Extract status word as a StatusWord object and payload from raw APDU response data
///
/// # Errors
/// Returns an error if the data is too short to contain a valid status word.
pub fn extract_status_and_payload(data: &[u8]) -> Result<(StatusWord, &[u8])> {
    let ((sw1, sw2), payload) = extract_response_parts(data)?;
    Ok((StatusWord::new(sw1, sw2), payload))
}
