//! # Enhanced ShockBurst Packet Encoder
//!
//! Assembles wire-ready frames from an address and payload.

use super::crc::{crc16_ccitt_continue, crc_update, CRC16_INIT};
use super::protocol::*;
use crate::error::{NordicTxError, Result};

/// Encode an address and payload into a complete Enhanced ShockBurst frame
///
/// # Arguments
///
/// * `address` - Destination address (2 to 5 bytes)
/// * `payload` - Payload (0 to 32 bytes)
/// * `crc_length` - Requested CRC length (1 or 2); two CRC bytes are written either way
///
/// # Returns
///
/// * `Result<ShockburstPacket>` - Frame of `1 + address + payload + 2` bytes
///
/// # Errors
///
/// Returns `UnsupportedLength` if any length is outside the supported range.
///
/// # Examples
///
/// ```
/// use nordic_tx::shockburst::encoder::encode_packet;
///
/// let packet = encode_packet(&[0xE7; 5], &[0x01, 0x02], 2)?;
/// assert_eq!(packet.byte_length(), 10);
/// assert_eq!(packet.preamble(), 0xAA);
/// # Ok::<(), nordic_tx::error::NordicTxError>(())
/// ```
pub fn encode_packet(address: &[u8], payload: &[u8], crc_length: u8) -> Result<ShockburstPacket> {
    validate_lengths(address.len(), payload.len(), crc_length)?;

    let address_length = address.len();
    let payload_length = payload.len();
    let crc_offset = PREAMBLE_LENGTH + address_length + payload_length;

    // Zero-filled, so the CRC slot is blank while the checksum is computed
    let mut bytes = vec![0u8; crc_offset + CRC_FIELD_LENGTH];
    bytes[0] = preamble_for(address[0]);
    bytes[PREAMBLE_LENGTH..PREAMBLE_LENGTH + address_length].copy_from_slice(address);
    bytes[PREAMBLE_LENGTH + address_length..crc_offset].copy_from_slice(payload);

    let crc = frame_crc(&bytes[PREAMBLE_LENGTH..crc_offset], bytes[crc_offset]);
    let crc_be = crc.to_be_bytes();
    bytes[crc_offset..].copy_from_slice(&crc_be);

    Ok(ShockburstPacket {
        address_length: address_length as u8,
        payload_length: payload_length as u8,
        crc_length,
        address: address.to_vec(),
        payload: payload.to_vec(),
        crc: crc_be[CRC_FIELD_LENGTH - crc_length as usize..].to_vec(),
        bytes,
    })
}

/// Checksum over address + payload plus the leading bit of the following byte
///
/// Enhanced ShockBurst packs its fields at bit granularity, so the CRC window
/// ends one bit into the byte after the payload.
///
/// # Arguments
///
/// * `covered` - Address followed by payload
/// * `trailing` - Byte immediately after the payload; only its MSB is folded in
pub fn frame_crc(covered: &[u8], trailing: u8) -> u16 {
    let crc = crc16_ccitt_continue(CRC16_INIT, covered);
    crc_update(crc, trailing & 0x80, 1)
}

/// Check address, payload and CRC lengths against the supported ranges
pub fn validate_lengths(address_length: usize, payload_length: usize, crc_length: u8) -> Result<()> {
    if address_length < ADDRESS_LENGTH_MIN as usize || address_length > ADDRESS_LENGTH_MAX as usize {
        return Err(NordicTxError::UnsupportedLength(
            format!("address length {} (must be {}-{})", address_length, ADDRESS_LENGTH_MIN, ADDRESS_LENGTH_MAX)
        ));
    }

    if payload_length > MAX_PAYLOAD_LENGTH as usize {
        return Err(NordicTxError::UnsupportedLength(
            format!("payload length {} exceeds maximum {}", payload_length, MAX_PAYLOAD_LENGTH)
        ));
    }

    if !(CRC_LENGTH_MIN..=CRC_LENGTH_MAX).contains(&crc_length) {
        return Err(NordicTxError::UnsupportedLength(
            format!("CRC length {} (must be {} or {})", crc_length, CRC_LENGTH_MIN, CRC_LENGTH_MAX)
        ));
    }

    Ok(())
}
