//! # Enhanced ShockBurst Packet Decoder
//!
//! Best-effort reconstruction of frames from captured bytes.
//!
//! The payload length is not decoded from the capture; every frame is assumed
//! to carry [`PARSE_PAYLOAD_LENGTH`] payload bytes. Frames of other lengths
//! fail the CRC check and are reported as mismatches.

use super::encoder::{encode_packet, frame_crc, validate_lengths};
use super::protocol::*;
use crate::error::{NordicTxError, Result};

/// Try to parse a frame from a preamble-aligned capture
///
/// # Arguments
///
/// * `window` - Captured bytes starting at the preamble
/// * `address_length` - Expected address width (2 to 5 bytes)
/// * `crc_length` - CRC length (1 or 2) recorded on the reconstructed packet
///
/// # Returns
///
/// * `Result<ShockburstPacket>` - Reconstructed frame if the CRC validates
///
/// # Errors
///
/// Returns error if:
/// - A length is unsupported (`UnsupportedLength`)
/// - The capture is shorter than `1 + address_length + 11 + 2` (`FrameTooShort`)
/// - The received CRC differs from the recomputed one (`CrcMismatch`)
///
/// # Examples
///
/// ```
/// use nordic_tx::shockburst::decoder::try_parse;
/// use nordic_tx::shockburst::encoder::encode_packet;
/// use nordic_tx::shockburst::protocol::CaptureWindow;
///
/// let sent = encode_packet(&[0xE7; 5], &[0x42; 11], 2)?;
/// let parsed = try_parse(&CaptureWindow::from_aligned(sent.bytes()), 5, 2)?;
/// assert_eq!(parsed.address(), sent.address());
/// # Ok::<(), nordic_tx::error::NordicTxError>(())
/// ```
pub fn try_parse(window: &CaptureWindow<'_>, address_length: u8, crc_length: u8) -> Result<ShockburstPacket> {
    validate_lengths(address_length as usize, PARSE_PAYLOAD_LENGTH as usize, crc_length)?;

    let bytes = window.aligned;
    let needed = packet_length(address_length, PARSE_PAYLOAD_LENGTH);
    if bytes.len() < needed {
        return Err(NordicTxError::FrameTooShort {
            needed,
            available: bytes.len(),
        });
    }

    let payload_offset = PREAMBLE_LENGTH + address_length as usize;
    let crc_offset = payload_offset + PARSE_PAYLOAD_LENGTH as usize;

    let received = u16::from_be_bytes([bytes[crc_offset], bytes[crc_offset + 1]]);
    // The transmitter folds in the CRC slot's MSB before the slot is written
    let computed = frame_crc(&bytes[PREAMBLE_LENGTH..crc_offset], 0x00);

    if computed != received {
        return Err(NordicTxError::CrcMismatch { computed, received });
    }

    encode_packet(
        &bytes[PREAMBLE_LENGTH..payload_offset],
        &bytes[payload_offset..crc_offset],
        crc_length,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: [u8; 5] = [0xE7, 0xE7, 0xE7, 0xE7, 0xE7];
    const PAYLOAD: [u8; 11] = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A];

    #[test]
    fn test_round_trip() {
        let sent = encode_packet(&ADDRESS, &PAYLOAD, 2).unwrap();
        let parsed = try_parse(&CaptureWindow::from_aligned(sent.bytes()), 5, 2).unwrap();

        assert_eq!(parsed.address(), &ADDRESS);
        assert_eq!(parsed.payload(), &PAYLOAD);
        assert_eq!(parsed.crc(), sent.crc());
        assert_eq!(parsed.bytes(), sent.bytes());
    }

    #[test]
    fn test_round_trip_ignores_trailing_capture() {
        let sent = encode_packet(&[0x12, 0x34, 0x56, 0x78, 0x9A], &PAYLOAD, 2).unwrap();
        let mut capture = sent.bytes().to_vec();
        capture.extend_from_slice(&[0x55; 8]);
        let shifted = vec![0u8; capture.len()];

        let parsed = try_parse(&CaptureWindow::new(&capture, &shifted), 5, 2).unwrap();
        assert_eq!(parsed.address(), &[0x12, 0x34, 0x56, 0x78, 0x9A]);
        assert_eq!(parsed.preamble(), 0x55);
    }

    #[test]
    fn test_round_trip_records_crc_length() {
        let sent = encode_packet(&ADDRESS, &PAYLOAD, 1).unwrap();
        let parsed = try_parse(&CaptureWindow::from_aligned(sent.bytes()), 5, 1).unwrap();
        assert_eq!(parsed.crc_length(), 1);
        assert_eq!(parsed.crc(), sent.crc());
    }

    #[test]
    fn test_single_bit_tamper_detected() {
        let sent = encode_packet(&ADDRESS, &PAYLOAD, 2).unwrap();

        // Address + payload region: bytes 1..17
        for index in 1..17 {
            for bit in 0..8 {
                let mut capture = sent.bytes().to_vec();
                capture[index] ^= 1 << bit;

                let result = try_parse(&CaptureWindow::from_aligned(&capture), 5, 2);
                assert!(
                    matches!(result, Err(NordicTxError::CrcMismatch { .. })),
                    "flip of byte {} bit {} went undetected",
                    index,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_corrupt_crc_detected() {
        let mut capture = encode_packet(&ADDRESS, &PAYLOAD, 2).unwrap().bytes().to_vec();
        capture[17] ^= 0xFF;

        match try_parse(&CaptureWindow::from_aligned(&capture), 5, 2) {
            Err(NordicTxError::CrcMismatch { computed, received }) => assert_ne!(computed, received),
            other => panic!("Expected CrcMismatch, got: {:?}", other),
        }
    }

    #[test]
    fn test_short_capture_rejected() {
        let sent = encode_packet(&ADDRESS, &PAYLOAD, 2).unwrap();
        let capture = &sent.bytes()[..sent.byte_length() - 1];

        match try_parse(&CaptureWindow::from_aligned(capture), 5, 2) {
            Err(NordicTxError::FrameTooShort { needed, available }) => {
                assert_eq!(needed, 19);
                assert_eq!(available, 18);
            }
            other => panic!("Expected FrameTooShort, got: {:?}", other),
        }
    }

    #[test]
    fn test_empty_capture_rejected() {
        let result = try_parse(&CaptureWindow::from_aligned(&[]), 5, 2);
        assert!(matches!(result, Err(NordicTxError::FrameTooShort { .. })));
    }

    #[test]
    fn test_unsupported_lengths_rejected() {
        let capture = [0u8; 64];
        assert!(matches!(
            try_parse(&CaptureWindow::from_aligned(&capture), 6, 2),
            Err(NordicTxError::UnsupportedLength(_))
        ));
        assert!(matches!(
            try_parse(&CaptureWindow::from_aligned(&capture), 5, 3),
            Err(NordicTxError::UnsupportedLength(_))
        ));
    }

    #[test]
    fn test_shorter_address_round_trip() {
        let sent = encode_packet(&[0xC2, 0xC2, 0xC2], &PAYLOAD, 2).unwrap();
        let parsed = try_parse(&CaptureWindow::from_aligned(sent.bytes()), 3, 2).unwrap();
        assert_eq!(parsed.address(), &[0xC2, 0xC2, 0xC2]);
    }
}
